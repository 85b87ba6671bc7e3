use crate::expr::*;
use itertools::Itertools;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unexpected token at {line}:{column}, expected one of: {expected}")]
pub struct ParseError {
	pub line: usize,
	pub column: usize,
	pub offset: usize,
	pub expected: String,
}

impl From<peg::error::ParseError<peg::str::LineCol>> for ParseError {
	fn from(err: peg::error::ParseError<peg::str::LineCol>) -> Self {
		ParseError {
			line: err.location.line,
			column: err.location.column,
			offset: err.location.offset,
			expected: err.expected.tokens().join(", "),
		}
	}
}

/// Переменные: первая буква из `u..z`, дальше только цифры, `_` и `'`. Остальные строчные имена это константы.
pub fn is_variable_name(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some('u'..='z') => chars.all(|c| c.is_ascii_digit() || c == '_' || c == '\''),
		_ => false,
	}
}

fn term_from_identifier(name: String) -> Formula {
	if is_variable_name(&name) {
		Formula::Variable { name }
	} else {
		Formula::Constant { value: name }
	}
}

fn fold_binary<F: Fn(Box<Formula>, Box<Formula>) -> Formula>(first: Formula, rest: Vec<Formula>, make: F) -> Formula {
	rest.into_iter().fold(first, |left, right| make(Box::new(left), Box::new(right)))
}

peg::parser!(
	grammar formula_parser() for str {
		pub rule formula() -> Formula
			= _ f:implication() _ { f }

		pub rule term() -> Formula
			= _ t:addition() _ { t }

		pub rule sequent() -> (Vec<Formula>, Vec<Formula>)
			= _ antecedent:formula_list() _ turnstile() _ succedent:formula_list() _ { (antecedent, succedent) }
			/ f:formula() { (Vec::new(), vec![f]) }

		pub rule sequent_formula() -> Formula
			= _ premises:formula_list() _ turnstile() _ conclusion:implication() _ {
				Formula::Sequent { premises, conclusion: Box::new(conclusion) }
			}

		rule formula_list() -> Vec<Formula>
			= implication() ** (_ "," _)

		// Левоассоциативно: `A⇒B⇒C` это `(A⇒B)⇒C`.
		rule implication() -> Formula
			= first:disjunction() rest:(_ implies() _ d:disjunction() { d })* {
				fold_binary(first, rest, |left, right| Formula::Implication { left, right })
			}

		rule disjunction() -> Formula
			= first:conjunction() rest:(_ or_sign() _ c:conjunction() { c })* {
				fold_binary(first, rest, |left, right| Formula::Disjunction { left, right })
			}

		rule conjunction() -> Formula
			= first:unary() rest:(_ and_sign() _ u:unary() { u })* {
				fold_binary(first, rest, |left, right| Formula::Conjunction { left, right })
			}

		rule unary() -> Formula
			= negations:(not_sign() _)+ operand:quantified() {
				Formula::Negation { operand: Box::new(operand), count: negations.len() }
			}
			/ quantified()

		rule quantified() -> Formula
			= "∀" _ variable:lower_identifier() _ "."? _ operand:unary() {
				Formula::Forall { variable, operand: Box::new(operand) }
			}
			/ "∃" _ variable:lower_identifier() _ "."? _ operand:unary() {
				Formula::Exists { variable, operand: Box::new(operand) }
			}
			/ primary()

		rule primary() -> Formula
			= equality()
			/ "⊤" { Formula::top() }
			/ "⊥" { Formula::bottom() }
			/ name:upper_identifier() _ "(" _ terms:addition() ++ (_ "," _) _ ")" {
				Formula::Predicate { name, terms }
			}
			/ value:upper_identifier() { Formula::Atom { value } }
			/ "(" _ f:implication() _ ")" { Formula::Parenthesis { value: Box::new(f) } }

		rule equality() -> Formula
			= left:addition() _ operator:equality_operator() _ right:addition() {
				Formula::Equality { operator, left: Box::new(left), right: Box::new(right) }
			}

		rule equality_operator() -> EqualityOperator
			= ("≠" / "!=") { EqualityOperator::NotEqual }
			/ "=" !">" { EqualityOperator::Equal }

		rule addition() -> Formula
			= first:multiplication() rest:(_ "+" _ m:multiplication() { m })* {
				fold_binary(first, rest, |left, right| Formula::Addition { left, right })
			}

		rule multiplication() -> Formula
			= first:term_primary() rest:(_ "*" _ p:term_primary() { p })* {
				fold_binary(first, rest, |left, right| Formula::Multiplication { left, right })
			}

		rule term_primary() -> Formula
			= "s" _ "(" _ term:addition() _ ")" { Formula::Successor { term: Box::new(term) } }
			/ name:lower_identifier() _ "(" _ terms:addition() ++ (_ "," _) _ ")" {
				Formula::Function { name, terms }
			}
			/ value:$(['0'..='9']+) { Formula::Number { value: value.to_string() } }
			/ name:lower_identifier() { term_from_identifier(name) }
			/ "(" _ term:addition() _ ")" { Formula::Parenthesis { value: Box::new(term) } }

		rule implies() = "⇒" / "→" / "=>" / "->"
		rule or_sign() = "∨" / "|" !"-"
		rule and_sign() = "∧" / "&"
		rule not_sign() = "¬" / "~" / "!" !"="
		rule turnstile() = "⊢" / "|-"

		rule lower_identifier() -> String
			= n:$(['a'..='z'] ['a'..='z' | '0'..='9' | '_' | '\'']*) { String::from(n) }

		rule upper_identifier() -> String
			= n:$(['A'..='Z'] ['a'..='z' | 'A'..='Z' | '0'..='9' | '_']*) { String::from(n) }

		rule _() = quiet!{[' ' | '\n' | '\t' | '\r']*}
	}
);

fn is_identifier_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_' || c == '\''
}

/// Раскрывает сахар `s0`, `ss0` в `s(0)`, `s(s(0))` текстовой заменой до парсинга.
pub fn desugar_successors(text: &str) -> String {
	let chars: Vec<char> = text.chars().collect();
	let mut result = String::with_capacity(text.len());
	let mut i = 0;
	while i < chars.len() {
		let starts_word = i == 0 || !is_identifier_char(chars[i - 1]);
		if starts_word && chars[i] == 's' {
			let run = chars[i..].iter().take_while(|c| **c == 's').count();
			let digits = chars[i + run..].iter().take_while(|c| c.is_ascii_digit()).count();
			let end = i + run + digits;
			let ends_word = end == chars.len() || !is_identifier_char(chars[end]);
			if digits > 0 && ends_word {
				result.push_str(&"s(".repeat(run));
				result.extend(&chars[i + run..end]);
				result.push_str(&")".repeat(run));
				i = end;
				continue;
			}
		}
		result.push(chars[i]);
		i += 1;
	}
	result
}

pub fn parse_formula(text: &str) -> Result<Formula, ParseError> {
	Ok(formula_parser::formula(&desugar_successors(text))?)
}

pub fn parse_term(text: &str) -> Result<Formula, ParseError> {
	Ok(formula_parser::term(&desugar_successors(text))?)
}

/// `Γ ⊢ Δ`. Текст без `⊢` читается как `⊢ φ`.
pub fn parse_sequent(text: &str) -> Result<(Vec<Formula>, Vec<Formula>), ParseError> {
	Ok(formula_parser::sequent(&desugar_successors(text))?)
}

/// Секвент с одним заключением как один узел `Formula::Sequent`.
pub fn parse_sequent_formula(text: &str) -> Result<Formula, ParseError> {
	Ok(formula_parser::sequent_formula(&desugar_successors(text))?)
}

/// Единственный способ построить узел для подстановки: текст перечитывается парсером.
/// Сначала как терм, затем как формула.
pub fn parse_replacement(text: &str) -> Result<Formula, ParseError> {
	parse_term(text).or_else(|_| parse_formula(text))
}
