use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Structural kind of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
	#[serde(rename = "VW")]
	View,
	#[serde(rename = "SVW")]
	SubView,
	#[serde(rename = "TRK")]
	Project,
	#[serde(rename = "BRC")]
	Module,
	#[serde(rename = "DIR")]
	Directory,
	#[serde(rename = "FIL")]
	File,
	#[serde(rename = "UTS")]
	UnitTestFile,
}
impl Qualifier {
	pub const ALL: [Self; 7] = [
		Self::View,
		Self::SubView,
		Self::Project,
		Self::Module,
		Self::Directory,
		Self::File,
		Self::UnitTestFile,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::View => "VW",
			Self::SubView => "SVW",
			Self::Project => "TRK",
			Self::Module => "BRC",
			Self::Directory => "DIR",
			Self::File => "FIL",
			Self::UnitTestFile => "UTS",
		}
	}
}
impl fmt::Display for Qualifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Qualifier {
	type Err = UnknownQualifier;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|qualifier| qualifier.as_str() == s)
			.ok_or_else(|| UnknownQualifier(s.to_string()))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown qualifier {0:?}.")]
pub struct UnknownQualifier(pub String);
