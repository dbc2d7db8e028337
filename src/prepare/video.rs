use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::write_output;

const SENTENCES_PER_PARAGRAPH: usize = 4;

/// One timestamped piece of a transcription, times in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Either a bare segment list or a verbose transcription object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Transcript {
    Segments(Vec<Segment>),
    Verbose { segments: Vec<Segment> },
}

/// Merge segments into sentences: a sentence ends with the first segment
/// whose text ends with a full stop. Trailing segments without one form a
/// last sentence.
pub fn sentences(segments: &[Segment]) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut current: Option<Segment> = None;

    for seg in segments {
        let text = seg.text.trim();
        let sentence = current.get_or_insert_with(|| Segment {
            text: String::new(),
            start: seg.start,
            end: seg.end,
        });
        if !sentence.text.is_empty() && !text.is_empty() {
            sentence.text.push(' ');
        }
        sentence.text.push_str(text);
        sentence.end = seg.end;

        if text.ends_with('.') {
            out.extend(current.take());
        }
    }
    out.extend(current.filter(|s| !s.text.is_empty()));
    out
}

/// Group sentences four at a time; the last paragraph takes the remainder.
pub fn paragraphs(sentences: &[Segment]) -> Vec<Segment> {
    sentences
        .chunks(SENTENCES_PER_PARAGRAPH)
        .filter_map(|group| {
            let first = group.first()?;
            let last = group.last()?;
            Some(Segment {
                text: group
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
                start: first.start,
                end: last.end,
            })
        })
        .collect()
}

/// Render paragraphs with their time range and a deep link into the video.
pub fn render(paragraphs: &[Segment], video_url: &str) -> String {
    let mut out = String::new();
    for p in paragraphs {
        let start = p.start.round() as i64;
        let end = p.end.round() as i64;
        let duration = (p.end - p.start).round() as i64;
        out.push_str(&format!(
            "O seguinte texto foi dito entre os segundos {start} e {end} do vídeo: {}\n\
             (Para acessar o conteúdo, clique no link {video_url}&t={start}. O vídeo já está na \
             minutagem do conteúdo em questão e ele dura cerca de {duration} segundos.)\n\n\n",
            p.text
        ));
    }
    out
}

/// Read transcription segments from `input` and write the paragraph text to
/// `output`. Returns the number of paragraphs.
pub fn prepare_video(input: &Path, output: &Path, video_url: &str) -> Result<usize> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let transcript: Transcript = serde_json::from_str(&raw)
        .with_context(|| format!("{} holds no transcription segments", input.display()))?;
    let segments = match transcript {
        Transcript::Segments(s) | Transcript::Verbose { segments: s } => s,
    };

    let paragraphs = paragraphs(&sentences(&segments));
    write_output(output, &render(&paragraphs, video_url))?;
    tracing::info!(
        segments = segments.len(),
        paragraphs = paragraphs.len(),
        "video transcription prepared"
    );
    Ok(paragraphs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, start: f64, end: f64) -> Segment {
        Segment {
            text: text.into(),
            start,
            end,
        }
    }

    #[test]
    fn segments_merge_until_full_stop() {
        let s = sentences(&[
            seg(" Hoje vamos falar", 0.0, 2.0),
            seg(" de listas.", 2.0, 3.5),
            seg(" Elas organizam itens.", 3.5, 6.0),
            seg(" E tabelas", 6.0, 7.0),
        ]);
        assert_eq!(
            s,
            vec![
                seg("Hoje vamos falar de listas.", 0.0, 3.5),
                seg("Elas organizam itens.", 3.5, 6.0),
                seg("E tabelas", 6.0, 7.0),
            ]
        );
    }

    #[test]
    fn paragraphs_take_four_sentences_and_a_remainder() {
        let sentences: Vec<Segment> = (0..6)
            .map(|i| seg(&format!("F{i}."), i as f64 * 10.0, i as f64 * 10.0 + 9.0))
            .collect();
        let p = paragraphs(&sentences);
        assert_eq!(p.len(), 2);
        assert_eq!(p[0], seg("F0. F1. F2. F3.", 0.0, 39.0));
        assert_eq!(p[1], seg("F4. F5.", 40.0, 59.0));
    }

    #[test]
    fn render_links_to_the_paragraph_start() {
        let text = render(&[seg("A tag table cria tabelas.", 12.4, 30.6)], "https://youtu.be/abc");
        assert!(text.starts_with(
            "O seguinte texto foi dito entre os segundos 12 e 31 do vídeo: A tag table cria tabelas.\n"
        ));
        assert!(text.contains("https://youtu.be/abc&t=12."));
        assert!(text.contains("dura cerca de 18 segundos"));
    }

    #[test]
    fn accepts_verbose_transcripts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("segments.json");
        let output = tmp.path().join("video.txt");
        std::fs::write(
            &input,
            r#"{"text": "...", "segments": [{"text": " Olá.", "start": 0.0, "end": 1.2, "id": 0}]}"#,
        )
        .unwrap();

        assert_eq!(prepare_video(&input, &output, "https://youtu.be/abc").unwrap(), 1);
        assert!(std::fs::read_to_string(&output).unwrap().contains("Olá."));
    }
}
