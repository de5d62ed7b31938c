//! Prompt text sent alongside the image. Each prompt pins down the output
//! shape its parser expects, so edits here must keep the two in step.

use crate::models::ResponseMode;

pub const IDENTIFY: &str = include_str!("../data/prompts/identify.txt");
pub const CANDIDATES: &str = include_str!("../data/prompts/candidates.txt");
pub const REDIRECT: &str = include_str!("../data/prompts/redirect.txt");

pub fn for_mode(mode: ResponseMode) -> &'static str {
    match mode {
        ResponseMode::Identify => IDENTIFY,
        ResponseMode::Candidates => CANDIDATES,
        ResponseMode::Redirect => REDIRECT,
    }
}
