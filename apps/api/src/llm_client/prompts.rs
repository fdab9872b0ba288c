// Prompt templates sent through the LLM gateway.
// Free-form chat messages are forwarded unmodified and have no template.

/// Structured role prediction. The reply must be a two-field JSON object,
/// parsed by `resume::prediction::parse_role_prediction`.
pub const ROLE_PREDICTION_PROMPT_TEMPLATE: &str = r#"
You are an AI career advisor specializing in job role prediction. Based on the resume text below, predict the most suitable job role and provide a confidence score. Analyze skills, experience, and education to ensure accuracy. Return the result in this exact JSON format:
{
  "job_role": "<predicted job role>",
  "confidence": "<confidence score as a percentage (e.g., 85.50%)>"
}

Resume Text:
{resume_text}
"#;

/// Free-text resume review returned verbatim as the `analysis` field.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"
You are an experienced recruiter and resume reviewer. Review the resume text below and write a concise report with:
- an overall resume score out of 100
- an estimated ATS parse rate as a percentage
- feedback under these headings: Content Suggestions, Spelling & Grammar, Resume Length, Personal Details, Formatting Tips
- the three most valuable improvements the candidate should make first

Base every comment on the resume text only. Do not invent experience the candidate does not list.

Resume Text:
{resume_text}
"#;

pub fn role_prediction_prompt(resume_text: &str) -> String {
    ROLE_PREDICTION_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

pub fn resume_analysis_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}
