// Prompt templates for the LLM-backed collaborators

use std::fmt::Write as _;

use super::web_search::SearchHit;
use crate::pipeline::{CritiqueRequest, WriterBrief};

pub const RESEARCH_SYSTEM: &str = "You are a research assistant preparing background \
material for a LinkedIn post. Be factual and concise. Reply with JSON only.";

pub const JSON_ONLY_SYSTEM: &str = "Reply with a single JSON object and nothing else.";

pub fn writer_prompt(brief: &WriterBrief) -> String {
    format!(
        "You are a professional LinkedIn ghostwriter.\n\n\
         Write a {word_limit}-word LinkedIn post from these details:\n\n\
         - Topic: {topic}\n\
         - Description: {description}\n\
         - Research Summary: {research_summary}\n\
         - Tone: {tone}\n\
         - Audience: {audience}\n\
         - Intent: {intent}\n\n\
         Structure:\n\
         1. Open with a hook that earns attention.\n\
         2. Build the body around insights or stats from the research.\n\
         3. Keep the tone, audience and intent present throughout.\n\
         4. Close with a reflective or actionable takeaway.\n\
         5. Ask a question that invites replies.\n\n\
         Formatting rules:\n\
         - No markdown (no asterisks, bold or italics).\n\
         - No quotation marks unless quoting someone.\n\
         - Hashtags only at the very end, and only if they fit.\n\
         - Use plain line breaks between paragraphs.\n\n\
         Return the post in this JSON format:\n\
         {{\"content\": \"<LinkedIn post>\"}}",
        word_limit = brief.word_limit,
        topic = brief.topic,
        description = brief.description,
        research_summary = brief.research_summary,
        tone = brief.tone,
        audience = brief.audience,
        intent = brief.intent,
    )
}

pub fn critic_prompt(request: &CritiqueRequest) -> String {
    format!(
        "You are a critical LinkedIn content reviewer.\n\n\
         Score the post below from 1 to 10 on each of:\n\
         1. Clarity\n\
         2. Tone alignment\n\
         3. Engagement\n\
         4. Relevance to the stated intent\n\n\
         Post:\n{post}\n\n\
         User Intent: {intent}\n\
         Tone: {tone}\n\
         Audience: {audience}\n\n\
         Then give a two-line improvement suggestion.\n\n\
         Return your feedback in this JSON format:\n\
         {{\"clarity\": <score>, \"tone\": <score>, \"engagement\": <score>, \
         \"relevance\": <score>, \"suggestion\": \"<tip>\"}}",
        post = request.post,
        intent = request.intent,
        tone = request.tone,
        audience = request.audience,
    )
}

/// Research query preceded by today's date and numbered web sources
pub fn sourced_research_prompt(query: &str, hits: &[SearchHit], today: &str) -> String {
    let mut sources = String::new();
    if hits.is_empty() {
        sources.push_str("No web results were found; rely on what you already know.\n");
    }
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(sources, "[{}] {} ({})\n{}", i + 1, hit.title, hit.url, hit.content.trim());
    }

    format!(
        "Current date: {today}\n\n\
         Web search results:\n{sources}\n\
         Use the results above where they help, prefer the most recent facts, \
         and do not cite links.\n\n\
         {query}"
    )
}

pub fn image_prompt(locator: &str) -> String {
    format!(
        "You analyze images for LinkedIn content.\n\
         For the image below provide:\n\
         1. A concise description of the image.\n\
         2. The key elements or objects in it.\n\
         3. The overall sentiment or mood (e.g. professional, innovative, \
         collaborative, formal, informal).\n\n\
         Image data/path/description: {locator}\n\n\
         Return your analysis in this JSON format:\n\
         {{\"description\": \"<description>\", \"key_elements\": [\"<element>\"], \
         \"sentiment\": \"<sentiment>\"}}"
    )
}

pub fn video_prompt(locator: &str) -> String {
    format!(
        "You analyze video content for LinkedIn posts.\n\
         From the video data below (a transcript, summary or description) extract:\n\
         1. A brief summary of the content.\n\
         2. The key moments or topics discussed.\n\
         3. The overall sentiment or tone.\n\n\
         Video data/transcript/summary: {locator}\n\n\
         Return your analysis in this JSON format:\n\
         {{\"summary\": \"<summary>\", \"key_moments\": [\"<moment>\"], \
         \"sentiment\": \"<sentiment>\"}}"
    )
}
