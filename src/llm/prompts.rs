// src/llm/prompts.rs
//! Prompt templates for every model-backed path

use serde_json::json;

use crate::types::{CoverLetterRequest, JobPosting, Profile};

pub fn parse_resume(raw_text: &str) -> Vec<String> {
    let shape = json!({
        "name": "string",
        "email": "string",
        "phone": "string",
        "location": "string",
        "linkedin": "string",
        "summary": "string",
        "skills": ["string"],
        "experience": [{"company": "string", "role": "string", "years": "string", "description": "string"}],
        "education": [{"degree": "string", "institution": "string", "years": "string"}],
        "projects": [{"name": "string", "description": "string", "tech": ["string"]}],
        "suggested_titles": ["string"]
    });

    vec![
        "You extract structured data from resumes. Respond with STRICT JSON only. \
         Do not invent facts that are not in the resume; leave fields empty instead. \
         `suggested_titles` holds 3-5 role titles matching the candidate's experience."
            .to_string(),
        format!("Return JSON matching this shape:\n{}", shape),
        format!("Resume text:\n{}", raw_text),
        "Output JSON:".to_string(),
    ]
}

pub fn rank_jobs(profile: &Profile, jobs: &[JobPosting]) -> Vec<String> {
    let indexed: Vec<_> = jobs
        .iter()
        .enumerate()
        .map(|(index, job)| json!({"index": index, "job": job}))
        .collect();

    let shape = json!({
        "scores": [{
            "index": 0,
            "score": 0.82,
            "fit_summary": "Strong cloud background",
            "skill_alignment": ["aws"],
            "gaps": ["fintech domain"]
        }],
        "suggested_titles": ["Cloud Engineer", "Backend Engineer"]
    });

    vec![
        "You evaluate candidate -> job fit. Given structured resume data and job listings, \
         respond with STRICT JSON only. Score every job between 0 and 1 and always include \
         every provided index exactly once. Give concise reasoning and list the skills that \
         align or are missing. Also produce `suggested_titles` (3-5 role titles)."
            .to_string(),
        format!(
            "Return JSON matching this shape:\n{}\nNever include commentary outside JSON.",
            shape
        ),
        format!(
            "Structured Input:\n{}",
            json!({
                "resume": profile,
                "resume_text": profile.textual_view(),
                "jobs": indexed,
            })
        ),
        "Output JSON:".to_string(),
    ]
}

pub fn search_query(profile: &Profile, suggested_titles: &[String]) -> Vec<String> {
    let example = json!({"query": "Cloud Engineer jobs requiring Python, AWS, Docker"});

    vec![format!(
        "You are a job search query builder. Given a resume (skills, experience, projects) \
         and suggested titles, produce a short query string (max 10 words) for searching jobs. \
         Focus on roles and skills. Respond only with JSON.\n\n\
         Example:\n{}\n\n\
         Resume:\n{}\n\
         Suggested Titles: {}\n\
         Output JSON with key 'query'.",
        example,
        json!(profile),
        suggested_titles.join(", ")
    )]
}

pub fn cover_letter(request: &CoverLetterRequest) -> Vec<String> {
    vec![format!(
        "You are a cover-letter writing assistant. Draft a tailored cover letter in clean, \
         readable prose. Constraints: no hallucinations, incorporate specific overlap between \
         resume and job description, keep it ATS-friendly (no tables or columns), no markdown. \
         Respond strictly in JSON with key 'cover_letter_text'.\n\n\
         Tone: {}\n\
         Length: {:?}\n\
         Resume JSON:\n{}\n\n\
         Job JSON:\n{}\n\n\
         Example JSON shape:\n{}\n\
         Now return only the JSON with 'cover_letter_text'.",
        request.tone,
        request.length,
        json!(request.resume),
        json!(request.job),
        json!({"cover_letter_text": "string"})
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_prompt_indexes_every_job() {
        let jobs = vec![JobPosting::new("A", "first"), JobPosting::new("B", "second")];
        let parts = rank_jobs(&Profile::default(), &jobs);
        let input = &parts[2];
        assert!(input.contains("\"index\":0"));
        assert!(input.contains("\"index\":1"));
    }

    #[test]
    fn test_search_prompt_lists_titles() {
        let titles = vec!["Data Engineer".to_string(), "AI Engineer".to_string()];
        let parts = search_query(&Profile::default(), &titles);
        assert!(parts[0].contains("Suggested Titles: Data Engineer, AI Engineer"));
    }
}
