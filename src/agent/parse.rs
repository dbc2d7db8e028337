//! Parser for the model's ReAct-formatted output.
//!
//! A step is either
//!
//! ```text
//! Thought: ...
//! Action: get_content
//! Action Input: {"user_message": "...", "format": "text"}
//! ```
//!
//! or
//!
//! ```text
//! Thought: ...
//! Answer: ...
//! ```
//!
//! Output with no markers at all is taken as a bare answer.

const THOUGHT: &str = "Thought:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const ANSWER: &str = "Answer:";

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Act {
        thought: Option<String>,
        action: String,
        input: String,
    },
    Answer {
        thought: Option<String>,
        answer: String,
    },
}

/// Parse one model completion. The error is a message suitable for an
/// observation telling the model what to fix.
pub fn parse_step(text: &str) -> Result<Step, String> {
    let text = text.trim();
    let action_at = find_marker(text, ACTION);
    let answer_at = find_marker(text, ANSWER);
    let thought = extract_thought(text);

    match (action_at, answer_at) {
        (Some(a), Some(b)) if b < a => Ok(answer_step(text, b, thought)),
        (Some(a), _) => act_step(text, a, thought),
        (None, Some(b)) => Ok(answer_step(text, b, thought)),
        (None, None) if text.is_empty() => Err("resposta vazia; comece com um Thought.".into()),
        (None, None) if text.contains(THOUGHT) => Err(
            "faltou 'Action:' com 'Action Input:' ou 'Answer:' depois do Thought.".into(),
        ),
        (None, None) => Ok(Step::Answer {
            thought: None,
            answer: text.to_string(),
        }),
    }
}

/// Byte position of `marker` at the start of a line.
fn find_marker(text: &str, marker: &str) -> Option<usize> {
    let mut pos = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with(marker) {
            return Some(pos + (line.len() - line.trim_start().len()));
        }
        pos += line.len();
    }
    None
}

fn extract_thought(text: &str) -> Option<String> {
    let start = find_marker(text, THOUGHT)? + THOUGHT.len();
    let rest = &text[start..];
    let end = [ACTION, ANSWER]
        .iter()
        .filter_map(|m| find_marker(rest, m))
        .min()
        .unwrap_or(rest.len());
    let thought = rest[..end].trim();
    (!thought.is_empty()).then(|| thought.to_string())
}

fn answer_step(text: &str, at: usize, thought: Option<String>) -> Step {
    Step::Answer {
        thought,
        answer: text[at + ANSWER.len()..].trim().to_string(),
    }
}

fn act_step(text: &str, at: usize, thought: Option<String>) -> Result<Step, String> {
    let after = &text[at + ACTION.len()..];
    // "Action Input:" also starts with "Action", so take the action line only.
    let action = after.lines().next().unwrap_or("").trim().to_string();
    if action.is_empty() {
        return Err("'Action:' sem nome de ferramenta.".into());
    }

    let input_at = find_marker(after, ACTION_INPUT)
        .ok_or_else(|| format!("faltou 'Action Input:' para a ferramenta {action}."))?;
    let raw_input = &after[input_at + ACTION_INPUT.len()..];
    let input = extract_json_object(raw_input)
        .ok_or_else(|| format!("o Action Input de {action} não contém um objeto JSON."))?;

    Ok(Step::Act {
        thought,
        action,
        input: input.to_string(),
    })
}

/// The first balanced `{ ... }` in `text`, ignoring braces inside strings.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
