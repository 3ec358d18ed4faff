//! Tailoring service: picks resumes from the store, asks the model to tailor one and
//! write a cover letter, then scrubs markdown from the answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{complete_json, CompletionClient};
use crate::storage::{ResumeKind, ResumeStore, StorageError};
use crate::tailoring::analysis::{analyze_job_description, match_score, JobAnalysis, MatchScore};
use crate::tailoring::cleanup::clean_text;
use crate::tailoring::job_details::{extract_job_details, JobDetails};
use crate::tailoring::prompts::{build_tailor_prompt, TAILOR_SYSTEM};

const MIN_DESCRIPTION_CHARS: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TailorRequest {
    #[serde(default, alias = "jobDescription")]
    pub job_description: Option<String>,
    #[serde(default, alias = "jobDetails")]
    pub job_details: Option<JobDetails>,
    #[serde(default, alias = "selectedResume")]
    pub selected_resume: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeText {
    pub filename: String,
    pub content: String,
}

/// Shape the model is asked to return.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TailorOutput {
    selected_resume: String,
    reasoning: String,
    tailored_resume: String,
    cover_letter: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorResponse {
    pub success: bool,
    pub total_resumes_analyzed: usize,
    pub available_resumes: Vec<String>,
    pub selected_resume: String,
    pub reasoning: String,
    pub tailored_resume: String,
    pub cover_letter: String,
    pub job_details: JobDetails,
    pub match_score: MatchScore,
    pub analysis: JobAnalysis,
    pub timestamp: DateTime<Utc>,
}

fn validate_description(raw: Option<&str>) -> Result<&str, AppError> {
    let description = raw.unwrap_or_default();
    if description.trim().is_empty() {
        return Err(AppError::Validation("Job description is required".to_string()));
    }
    if description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "Job description is too short. Please provide at least {MIN_DESCRIPTION_CHARS} characters."
        )));
    }
    Ok(description)
}

/// Resolves which stored `.txt` file backs the caller's selection.
fn resolve_selection(selected: &str, txt_files: &[String]) -> Result<String, AppError> {
    match selected.strip_suffix(".pdf") {
        Some(stem) => {
            let txt = format!("{stem}.txt");
            if txt_files.contains(&txt) {
                Ok(txt)
            } else {
                Err(AppError::Validation(format!(
                    "PDF resumes require a corresponding .txt file for AI processing. \
                     Please upload a .txt version of {selected} to enable AI tailoring."
                )))
            }
        }
        None => Ok(selected.to_string()),
    }
}

async fn load_resumes(
    store: &dyn ResumeStore,
    selected: Option<&str>,
    txt_files: &[String],
) -> Result<Vec<ResumeText>, AppError> {
    if let Some(selected) = selected.filter(|s| !s.trim().is_empty()) {
        let filename = resolve_selection(selected, txt_files)?;
        let content = match store.get_text(&filename).await {
            Ok(content) => content,
            Err(StorageError::NotFound(_)) => {
                return Err(AppError::NotFound(format!(
                    "Selected resume \"{filename}\" not found"
                )))
            }
            Err(e) => return Err(e.into()),
        };
        return Ok(vec![ResumeText { filename, content }]);
    }

    let mut resumes = Vec::with_capacity(txt_files.len());
    for filename in txt_files {
        match store.get_text(filename).await {
            Ok(content) => resumes.push(ResumeText {
                filename: filename.clone(),
                content,
            }),
            Err(StorageError::NotFound(_)) => warn!("Resume {filename} vanished while loading"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(resumes)
}

pub async fn tailor_resume(
    store: &dyn ResumeStore,
    llm: &dyn CompletionClient,
    request: TailorRequest,
) -> Result<TailorResponse, AppError> {
    let description = validate_description(request.job_description.as_deref())?;

    let listing = store.list().await?;
    if listing.objects.is_empty() {
        return Err(AppError::NotFound("No resumes found in storage".to_string()));
    }

    let txt_files: Vec<String> = listing
        .objects
        .iter()
        .filter(|o| ResumeKind::of(&o.key) == ResumeKind::Txt)
        .map(|o| o.key.clone())
        .collect();
    if txt_files.is_empty() {
        return Err(AppError::NotFound(
            "No .txt resume files found for AI processing. \
             AI tailoring requires .txt files; PDF files are available for download only."
                .to_string(),
        ));
    }

    let resumes = load_resumes(store, request.selected_resume.as_deref(), &txt_files).await?;
    if resumes.is_empty() {
        return Err(AppError::Internal(anyhow::anyhow!("Failed to read resume files")));
    }

    let job_details = request
        .job_details
        .unwrap_or_else(|| extract_job_details(description));

    info!(
        "Tailoring against {} resume(s), company={:?}",
        resumes.len(),
        job_details.company_name
    );

    let prompt = build_tailor_prompt(&resumes, description, &job_details);
    let output: TailorOutput = complete_json(llm, TAILOR_SYSTEM, &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Tailoring failed: {e}")))?;

    let reasoning = clean_text(&output.reasoning);
    let score = match_score(&reasoning);
    info!("Model selected {} (match {})", output.selected_resume, score.score);

    Ok(TailorResponse {
        success: true,
        total_resumes_analyzed: resumes.len(),
        available_resumes: txt_files,
        selected_resume: output.selected_resume,
        reasoning,
        tailored_resume: clean_text(&output.tailored_resume),
        cover_letter: clean_text(&output.cover_letter),
        job_details,
        match_score: score,
        analysis: analyze_job_description(description),
        timestamp: Utc::now(),
    })
}
