//! Reads `name` out of the input map and greets it, defaulting to "World"
//! when the host supplied no `name` (or no input at all).

bud_plugin_sdk::entry_point!(main, |input| {
  let name = input
    .get("name")
    .and_then(|v| v.as_str())
    .unwrap_or("World");
  Ok(serde_json::json!({ "greeting": format!("Hello, {name}!") }))
});
