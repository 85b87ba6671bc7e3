use crate::expr::{structural_equals, Formula};
use crate::parsing::parse_formula;

/// Семь аксиом арифметики Робинсона.
pub const ROBINSON_AXIOMS: [&str; 7] = [
	"∀x(s(x)≠0)",
	"∀x∀y(s(x)=s(y)⇒x=y)",
	"∀x(x=0∨∃y(x=s(y)))",
	"∀x(x+0=x)",
	"∀x∀y(x+s(y)=s(x+y))",
	"∀x(x*0=0)",
	"∀x∀y(x*s(y)=x*y+x)",
];

pub fn robinson_axioms() -> Vec<Formula> {
	ROBINSON_AXIOMS.iter().filter_map(|text| parse_formula(text).ok()).collect()
}

/// Номер аксиомы (с единицы), которой структурно равна формула.
pub fn matching_axiom(formula: &Formula) -> Option<usize> {
	ROBINSON_AXIOMS
		.iter()
		.position(|text| parse_formula(text).map(|axiom| structural_equals(&axiom, formula)).unwrap_or(false))
		.map(|index| index + 1)
}
