use std::path::Path;

use anyhow::Result;

use crate::config::EdutorConfig;
use crate::prepare::exercises::prepare_exercises;
use crate::prepare::video::prepare_video;

pub fn exercises(input: &Path, output: &Path) -> Result<()> {
    let count = prepare_exercises(input, output)?;
    println!("{count} exercise(s) written to {}", output.display());
    Ok(())
}

pub fn video(config: &EdutorConfig, segments: &Path, output: &Path, video_url: Option<&str>) -> Result<()> {
    let url = video_url.unwrap_or(&config.media.video_url);
    let count = prepare_video(segments, output, url)?;
    println!("{count} paragraph(s) written to {}", output.display());
    Ok(())
}
