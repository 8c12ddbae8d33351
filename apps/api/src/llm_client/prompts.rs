// System prompts sent with every Messages API request.

/// System prompt that enforces JSON-array-only output.
pub const JSON_ARRAY_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with a valid JSON array only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
