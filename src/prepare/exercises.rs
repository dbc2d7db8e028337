use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{strip_html, write_output};

#[derive(Debug, Deserialize)]
pub struct ExerciseBank {
    pub content: Vec<Exercise>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
pub struct Exercise {
    pub title: String,
    pub content: ExerciseContent,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseContent {
    pub html: String,
    #[serde(default)]
    pub options: Vec<ExerciseOption>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseOption {
    pub content: Html,
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub feedback: Option<Html>,
}

#[derive(Debug, Deserialize)]
pub struct Html {
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct Tag {
    pub area: Named,
    pub course: Named,
    pub subject: Named,
}

#[derive(Debug, Deserialize)]
pub struct Named {
    pub name: String,
}

/// Render the bank as text, one block per exercise.
///
/// The feedback shown is the first option's, which in the bank explains the
/// whole question. Area, course and subject come from the bank's first tag.
pub fn render(bank: &ExerciseBank) -> String {
    let tag = bank.tags.first();
    let mut out = String::new();

    for exercise in &bank.content {
        let options = &exercise.content.options;

        out.push_str(exercise.title.trim());
        out.push('\n');
        out.push_str(&format!("Enunciado: {}\n", strip_html(&exercise.content.html)));
        for (i, option) in options.iter().enumerate() {
            out.push_str(&format!("Opção {}: {}\n", i + 1, strip_html(&option.content.html)));
        }
        if let Some(correct) = options.iter().position(|o| o.correct) {
            out.push_str(&format!("Opção correta: {}\n", correct + 1));
        }
        if let Some(feedback) = options.first().and_then(|o| o.feedback.as_ref()) {
            out.push_str(&format!(
                "Feedback do exercício: {}\n",
                strip_html(&feedback.html)
            ));
        }
        if let Some(tag) = tag {
            out.push_str(&format!("Área de estudo do exercício: {}\n", tag.area.name));
            out.push_str(&format!("Curso referente ao exercício: {}\n", tag.course.name));
            out.push_str(&format!(
                "Disciplina estudada no exercício: {}\n",
                tag.subject.name
            ));
        }
        out.push_str("\n\n\n");
    }
    out
}

/// Read the exercise bank at `input` and write its text form to `output`.
/// Returns the number of exercises.
pub fn prepare_exercises(input: &Path, output: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let bank: ExerciseBank = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not an exercise bank", input.display()))?;

    write_output(output, &render(&bank))?;
    tracing::info!(exercises = bank.content.len(), "exercise bank prepared");
    Ok(bank.content.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = r#"{
        "content": [{
            "title": "Exercício 1",
            "content": {
                "html": "<div class=\"question\"><p></p><p><strong>Qual tag define um parágrafo?</strong></p><p></p></div>",
                "options": [
                    {"content": {"html": "<div class=\"question-option\"><p>&lt;p&gt;</p></div>"}, "correct": true,
                     "feedback": {"html": "<div class=\"question-feedback\"> <p>A tag p define parágrafos.</p></div>"}},
                    {"content": {"html": "<div class=\"question-option\"><p>&lt;br&gt;</p></div>"}, "correct": false}
                ]
            }
        }],
        "tags": [{"area": {"name": "Tecnologia"}, "course": {"name": "Web"}, "subject": {"name": "HTML5"}}]
    }"#;

    #[test]
    fn renders_labelled_block() {
        let bank: ExerciseBank = serde_json::from_str(BANK).unwrap();
        let text = render(&bank);
        let expected = "Exercício 1\n\
                        Enunciado: Qual tag define um parágrafo?\n\
                        Opção 1: <p>\n\
                        Opção 2: <br>\n\
                        Opção correta: 1\n\
                        Feedback do exercício: A tag p define parágrafos.\n\
                        Área de estudo do exercício: Tecnologia\n\
                        Curso referente ao exercício: Web\n\
                        Disciplina estudada no exercício: HTML5\n\n\n\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn prepare_writes_the_output_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("bank.json");
        let output = tmp.path().join("data").join("exercises").join("exercises.txt");
        std::fs::write(&input, BANK).unwrap();

        assert_eq!(prepare_exercises(&input, &output).unwrap(), 1);
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("Exercício 1\nEnunciado:"));
    }
}
