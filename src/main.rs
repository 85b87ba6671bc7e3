use deduction::read_script;
use tracing_subscriber::EnvFilter;

const DEFAULT_SCRIPT: &str = "proofs/demo.proof";

fn check_script(path: &str) -> Result<(), String> {
	let input = std::fs::read_to_string(path).map_err(|err| format!("can't read `{}`: {}", path, err))?;
	read_script(&input).map_err(|_| format!("`{}` has errors", path))
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SCRIPT.to_string());
	match check_script(&path) {
		Ok(()) => println!("`{}` is OK", path),
		Err(err) => {
			println!("{}", err);
			std::process::exit(1);
		},
	}
}
