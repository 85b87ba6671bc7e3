/// Перечисление правил исчисления: у каждого правила есть метка для показа (`∧I`)
/// и стабильное символьное имя (`and_intro`). По любому из них правило находится через `FromStr`.
macro_rules! rules {
	(
		$(#[$meta:meta])*
		pub enum $name:ident {
			$($(#[$variant_meta:meta])* $variant:ident => ($label:expr, $symbol:expr)),* $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, ::serde::Serialize, ::serde::Deserialize)]
		pub enum $name {
			$($(#[$variant_meta])* $variant),*
		}

		impl $name {
			pub const ALL: &'static [$name] = &[$($name::$variant),*];

			pub fn label(&self) -> &'static str {
				match self {
					$($name::$variant => $label),*
				}
			}

			pub fn symbol(&self) -> &'static str {
				match self {
					$($name::$variant => $symbol),*
				}
			}
		}

		impl ::std::fmt::Display for $name {
			fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
				write!(f, "{}", self.label())
			}
		}

		impl ::std::str::FromStr for $name {
			type Err = $crate::proof::RuleError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				let s = s.trim();
				$name::ALL
					.iter()
					.copied()
					.find(|rule| rule.label() == s || rule.symbol() == s)
					.ok_or_else(|| $crate::proof::RuleError::UnknownRule(s.to_string()))
			}
		}
	};
}
