#[macro_use]
pub mod utils;

pub mod axioms;
pub mod binding;
pub mod expr;
pub mod fitch;
pub mod gentzen;
pub mod history;
pub mod parsing;
pub mod proof;
pub mod render;
pub mod script;
pub mod sequent;

/// Выполняет сценарий и печатает первую ошибку с подчёркнутой строкой.
pub fn read_script(input: &str) -> Result<(), ()> {
	script::execute(input).map(|_| ()).map_err(|err| err.print_error_snippet(input))
}
