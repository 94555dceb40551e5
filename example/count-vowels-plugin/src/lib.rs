//! Counts the vowels in its `input` string, returning both the count and
//! the vowels found. `count` is a number-normalisation key: the host
//! renormalises it to an integer on decode, regardless of the width this
//! module happens to emit it at.

bud_plugin_sdk::entry_point!(main, |input| {
  let text = input
    .get("input")
    .and_then(|v| v.as_str())
    .unwrap_or_default();

  let vowels: String = text
    .chars()
    .filter(|c| "aeiouAEIOU".contains(*c))
    .collect();

  Ok(serde_json::json!({
    "count": vowels.chars().count(),
    "vowels": vowels,
    "input": text,
  }))
});
