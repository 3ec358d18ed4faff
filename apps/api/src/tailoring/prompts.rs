// Prompts for the tailoring call. The model must answer with a single JSON object
// carrying selectedResume, reasoning, tailoredResume and coverLetter.

use crate::tailoring::job_details::JobDetails;
use crate::tailoring::service::ResumeText;

pub const TAILOR_SYSTEM: &str = "\
You are an expert resume writer and ATS optimization specialist. You tailor resumes to \
specific job descriptions while keeping them authentic and professional.

FORMATTING RULES:
1. Never use markdown (**, __, ##, *, and so on) in the output.
2. Plain text only: UPPERCASE section headers, bullet points with •.
3. Keep every original experience, skill and achievement.
4. Work relevant keywords from the job description naturally into existing content.
5. Reorder and emphasize sections to match the job requirements.
6. Keep the same sections and structure as the original resume.
7. Keep dates, company names and facts exactly as provided.
8. The output must be ATS-friendly plain text.

Optimize the resume for ATS systems and highlight relevant experience without changing \
facts or inventing content.";

const NOT_EXTRACTED: &str = "[Not extracted]";

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_EXTRACTED
    } else {
        value
    }
}

fn job_details_block(details: &JobDetails) -> String {
    format!(
        "EXTRACTED JOB DETAILS:\n\
         - Company Name: {}\n\
         - Hiring Manager: {}\n\
         - Address: {}\n\n\
         Use these details in the cover letter. If a detail was not extracted, keep the \
         placeholder or use a generic greeting.",
        or_placeholder(&details.company_name),
        or_placeholder(&details.hiring_manager),
        or_placeholder(&details.address),
    )
}

/// Lists every resume as `RESUME n (filename):` separated by `---`.
pub fn resumes_block(resumes: &[ResumeText]) -> String {
    resumes
        .iter()
        .enumerate()
        .map(|(idx, r)| format!("RESUME {} ({}):\n{}", idx + 1, r.filename, r.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

pub fn build_tailor_prompt(resumes: &[ResumeText], job_description: &str, details: &JobDetails) -> String {
    let names = resumes
        .iter()
        .map(|r| r.filename.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "I have {count} specialized resumes: {names}\n\n\
         Here are my resumes:\n\n\
         {resumes}\n\n\
         ---\n\n\
         Job Description:\n\
         {job_description}\n\n\
         {details}\n\n\
         ---\n\n\
         INSTRUCTIONS:\n\
         1. Identify the key requirements, skills and keywords in the job description.\n\
         2. Select the resume that best matches this role.\n\
         3. Tailor that resume: keep ALL original content, work JD keywords into existing \
         bullet points, reorder or emphasize matching sections, align the summary with the \
         role, and highlight transferable skills.\n\
         4. Write a cover letter addressed to the specific company and role. Use the \
         extracted company name, hiring manager and address in place of [COMPANY NAME], \
         [HIRING MANAGER'S NAME] and [COMPANY ADDRESS]; fall back to a professional generic \
         alternative when a detail is missing.\n\
         5. PLAIN TEXT ONLY, no markdown symbols.\n\n\
         Respond with a JSON object with these keys:\n\
         - \"selectedResume\": exact filename of the chosen resume\n\
         - \"reasoning\": 2-3 sentences explaining the choice\n\
         - \"tailoredResume\": the complete tailored resume in plain text\n\
         - \"coverLetter\": the complete cover letter in plain text",
        count = resumes.len(),
        resumes = resumes_block(resumes),
        details = job_details_block(details),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume(filename: &str, content: &str) -> ResumeText {
        ResumeText {
            filename: filename.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_resumes_are_numbered_and_separated() {
        let block = resumes_block(&[resume("backend.txt", "A"), resume("frontend.txt", "B")]);
        assert_eq!(block, "RESUME 1 (backend.txt):\nA\n\n---\n\nRESUME 2 (frontend.txt):\nB");
    }

    #[test]
    fn test_prompt_carries_details_and_placeholders() {
        let details = JobDetails {
            company_name: "Acme".into(),
            ..Default::default()
        };
        let prompt = build_tailor_prompt(&[resume("backend.txt", "A")], "Build APIs", &details);
        assert!(prompt.starts_with("I have 1 specialized resumes: backend.txt"));
        assert!(prompt.contains("- Company Name: Acme"));
        assert!(prompt.contains("- Hiring Manager: [Not extracted]"));
        assert!(prompt.contains("Job Description:\nBuild APIs"));
    }
}
