//! Runs the four end-to-end scenarios the WebAssembly backend is built
//! against, against WAT-derived fixtures rather than an installed plugin
//! directory, then demonstrates the config-driven `BudCore::builder` path.

use std::sync::Arc;
use std::time::Duration;

use core::{BudCore, DataProvider, EvalContext, Evaluator, ExecutableUnit, StaticProvider};
use shared_types::{InputMap, Value};
use wasm_provider::{fixtures, WasmCompiler};

fn run_scenario(label: &str, wat_src: &str, input: InputMap) {
  println!("\n=== {label} ===");
  let artifact = match fixtures::compile(wat_src, false) {
    Ok(artifact) => artifact,
    Err(e) => {
      println!("compile failed: {e}");
      return;
    }
  };

  let providers: Arc<dyn DataProvider> = Arc::new(StaticProvider::new(input));
  let unit = Arc::new(ExecutableUnit::new("demo", Arc::new(artifact), Some(providers)));
  let evaluator = Evaluator::new(Some(unit)).expect("a unit was just supplied");

  match evaluator.eval(EvalContext::new()) {
    Ok(result) => println!("ok in {}: {}", result.exec_time_human(), result.inspect()),
    Err(e) => println!("evaluation failed: {e}"),
  }
}

fn run_cancellation_scenario() {
  println!("\n=== Cancellation ===");
  let artifact = fixtures::compile(fixtures::SPIN_FOREVER_MODULE, false).expect("fixture compiles");
  let providers: Arc<dyn DataProvider> = Arc::new(StaticProvider::new(InputMap::new()));
  let unit = Arc::new(ExecutableUnit::new("spin", Arc::new(artifact), Some(providers)));
  let evaluator = Evaluator::new(Some(unit)).expect("a unit was just supplied");

  let ctx = EvalContext::new();
  let canceller = ctx.clone();
  let canceller_thread = std::thread::spawn(move || {
    std::thread::sleep(Duration::from_millis(30));
    canceller.cancel();
  });

  match evaluator.eval(ctx) {
    Ok(_) => println!("unexpectedly completed"),
    Err(e) => println!("cancelled as expected: {e}"),
  }
  canceller_thread.join().expect("canceller thread does not panic");
}

fn main() {
  run_scenario("Greet", fixtures::GREET_MODULE, InputMap::new());

  let mut count_input = InputMap::new();
  count_input.insert(
    "input".to_string(),
    Value::String("Hello World".to_string()),
  );
  run_scenario("Count vowels", fixtures::COUNT_VOWELS_MODULE, count_input);

  run_scenario(
    "Non-zero exit",
    fixtures::NONZERO_EXIT_MODULE,
    InputMap::new(),
  );

  run_cancellation_scenario();

  println!("\n=== Config-driven BudCore ===");
  match BudCore::builder(WasmCompiler::new()).build() {
    Ok(core) => println!("BudCore initialized! Config: {:?}", core.config),
    Err(e) => println!("BudCore initialization failed (no bud.json in this directory): {e}"),
  }
}
