// Shared prompt fragments. Each module that calls the LLM keeps its own
// prompts.rs alongside it and pulls cross-cutting fragments from here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Language instruction for every user-facing text the service writes.
pub const KOREAN_OUTPUT_INSTRUCTION: &str = "\
    Write every sentence in professional Korean. \
    Keep names, project names and numbers exactly as given.";
