// Prompt scaffold for the résumé analysis report. The section headings here
// are a contract with `analysis::report_parser`: the parser recognizes
// exactly these `##` titles, so changes must be made in both places.

use crate::models::role::RoleRequirement;

/// System prompt for providers that accept one separately from the user turn.
pub const ANALYST_SYSTEM: &str = "You are an expert resume analyst with deep knowledge of \
    industry standards, job requirements, and hiring practices across various fields. \
    You respond with a structured markdown report and nothing else.";

/// Builds the analysis prompt. The Role Alignment block is appended only when
/// a target role is supplied; the Job Match blocks only when a full role
/// description is supplied.
pub fn analysis_prompt(
    resume_text: &str,
    job_role: Option<&str>,
    role: Option<&RoleRequirement>,
) -> String {
    let mut prompt = format!(
        r#"You are an expert resume analyst with deep knowledge of industry standards, job requirements, and hiring practices across various fields. Your task is to provide a comprehensive, detailed analysis of the resume provided.
Please structure your response in the following format:
## Overall Assessment
[Provide a detailed assessment of the resume's overall quality, effectiveness, and alignment with industry standards. Include specific observations about formatting, content organization, and general impression. Be thorough and specific.]
## Professional Profile Analysis
[Analyze the candidate's professional profile, experience trajectory, and career narrative. Discuss how well their story comes across and whether their career progression makes sense for their apparent goals.]
## Skills Analysis
- **Current Skills**: [List ALL skills the candidate demonstrates in their resume, categorized by type (technical, soft, domain-specific, etc.). Be comprehensive.]
- **Skill Proficiency**: [Assess the apparent level of expertise in key skills based on how they're presented in the resume]
- **Missing Skills**: [List important skills that would improve the resume for their target role. Be specific and explain why each skill matters.]
## Experience Analysis
[Provide detailed feedback on how well the candidate has presented their experience. Analyze the use of action verbs, quantifiable achievements, and relevance to their target role. Suggest specific improvements.]
## Education Analysis
[Analyze the education section, including relevance of degrees, certifications, and any missing educational elements that would strengthen their profile.]
## Key Strengths
[List 5-7 specific strengths of the resume with detailed explanations of why these are effective]
## Areas for Improvement
[List 5-7 specific areas where the resume could be improved with detailed, actionable recommendations]
## ATS Optimization Assessment
[Analyze how well the resume is optimized for Applicant Tracking Systems. Provide a specific ATS score from 0-100, with 100 being perfectly optimized. Use this format: "ATS Score: XX/100". Then suggest specific keywords and formatting changes to improve ATS performance.]
## Recommended Courses/Certifications
[Suggest 5-7 specific courses or certifications that would enhance the candidate's profile, with a brief explanation of why each would be valuable]
## Resume Score
[Provide a score from 0-100 based on the overall quality of the resume. Use this format exactly: "Resume Score: XX/100" where XX is the numerical score. Be consistent with your assessment - a resume with significant issues should score below 60, an average resume 60-75, a good resume 75-85, and an excellent resume 85-100.]
Resume:
{resume_text}
"#
    );

    if let Some(job_role) = job_role {
        prompt.push_str(&format!(
            r#"
The candidate is targeting a role as: {job_role}
## Role Alignment Analysis
[Analyze how well the resume aligns with the target role of {job_role}. Provide specific recommendations to better align the resume with this role.]
"#
        ));
    }

    if let Some(role) = role {
        let job_description = format!(
            "Role: {}\nDescription: {}\nRequired Skills: {}",
            role.name,
            role.description,
            role.required_skills.join(", ")
        );
        prompt.push_str(&format!(
            r#"
Additionally, compare this resume to the following job description:
Job Description:
{job_description}
## Job Match Analysis
[Provide a detailed analysis of how well the resume matches the job description, with a match percentage and specific areas of alignment and misalignment]
## Key Job Requirements Not Met
[List specific requirements from the job description that are not addressed in the resume, with recommendations on how to address each gap]
"#
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_role() -> RoleRequirement {
        RoleRequirement {
            name: "Backend Developer".to_string(),
            category: "Software Development".to_string(),
            description: "Server-side applications and APIs".to_string(),
            required_skills: vec!["python".to_string(), "sql".to_string()],
        }
    }

    #[test]
    fn test_base_prompt_carries_all_report_sections() {
        let prompt = analysis_prompt("resume body", None, None);
        for heading in [
            "## Overall Assessment",
            "## Professional Profile Analysis",
            "## Skills Analysis",
            "## Experience Analysis",
            "## Education Analysis",
            "## Key Strengths",
            "## Areas for Improvement",
            "## ATS Optimization Assessment",
            "## Recommended Courses/Certifications",
            "## Resume Score",
        ] {
            assert!(prompt.contains(heading), "missing {heading}");
        }
        assert!(prompt.contains("resume body"));
    }

    #[test]
    fn test_role_alignment_block_only_with_target_role() {
        let without = analysis_prompt("text", None, None);
        assert!(!without.contains("## Role Alignment Analysis"));

        let with = analysis_prompt("text", Some("Backend Developer"), None);
        assert!(with.contains("## Role Alignment Analysis"));
        assert!(with.contains("targeting a role as: Backend Developer"));
    }

    #[test]
    fn test_job_match_blocks_only_with_role_description() {
        let role = sample_role();
        let without = analysis_prompt("text", Some(role.name.as_str()), None);
        assert!(!without.contains("## Job Match Analysis"));

        let with = analysis_prompt("text", Some(role.name.as_str()), Some(&role));
        assert!(with.contains("## Job Match Analysis"));
        assert!(with.contains("## Key Job Requirements Not Met"));
        assert!(with.contains("Required Skills: python, sql"));
    }

    #[test]
    fn test_score_format_instructions_are_verbatim() {
        let prompt = analysis_prompt("text", None, None);
        assert!(prompt.contains("\"Resume Score: XX/100\""));
        assert!(prompt.contains("\"ATS Score: XX/100\""));
    }
}
