//! Error handling for Pineapple
//!
//! Every static rule violation is one variant of [`Error`]. The first error
//! raised aborts the whole compilation; the session pairs it with the file
//! it came from to form a [`Diagnostic`].

use crate::types::Type;
use crate::utils::{Location, SourceFile};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Compiler error
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ==================== Undefined Names ====================

    #[error("The type `{name}` is not defined{}", did_you_mean(.suggestions))]
    UsingUndefinedType {
        name: String,
        suggestions: Vec<String>,
        location: Location,
    },

    #[error("The generic name `{name}` does not exist in the current scope{}", did_you_mean(.suggestions))]
    UsingUndefinedGenericName {
        name: String,
        suggestions: Vec<String>,
        location: Location,
    },

    #[error("There is no struct named `{name}`")]
    UsingUndefinedStruct { name: String, location: Location },

    #[error("{name} expects {expected} type argument(s), but was given {actual}")]
    WrongNumberOfTypeArguments {
        name: String,
        expected: usize,
        actual: usize,
        location: Location,
    },

    #[error("There is no enum providing `{name}`")]
    UsingUndefinedEnum { name: String, location: Location },

    #[error("The variable `{name}` is not defined{}", did_you_mean(.suggestions))]
    UsingUndefinedVariable {
        name: String,
        suggestions: Vec<String>,
        location: Location,
    },

    #[error("You cannot call the function `{signature}` as it does not exist")]
    UsingUnknownFunction { signature: String, location: Location },

    // ==================== Redeclarations ====================

    #[error("The struct `{name}` is already defined in {previous_origin}")]
    StructRedeclare {
        name: String,
        previous_origin: String,
        location: Location,
    },

    #[error("The enum `{name}` is already defined in {previous_origin}")]
    EnumRedeclare {
        name: String,
        previous_origin: String,
        location: Location,
    },

    #[error("The group `{name}` is already defined")]
    GroupRedeclare { name: String, location: Location },

    #[error("{child} can only be bound into a group, but {parent} is not a group")]
    BindingToNonGroup {
        child: Type,
        parent: Type,
        location: Location,
    },

    #[error("The variable `{name}` is already declared")]
    VariableRedeclare { name: String, location: Location },

    // ==================== Assignments ====================

    #[error("You cannot assign a value to `{name}` as it is immutable")]
    AssigningToImmutableVariable { name: String, location: Location },

    #[error("You cannot assign to `{name}` as it was never declared")]
    AssigningToUndefinedVariable { name: String, location: Location },

    #[error("You cannot assign a Void expression to `{name}`")]
    AssigningVoidToVariable { name: String, location: Location },

    #[error("You cannot assign nil to `{name}` as its type {expected} is not nullable")]
    AssigningNullToUnnullableVariable {
        name: String,
        expected: Type,
        location: Location,
    },

    // ==================== Type Mismatches ====================

    #[error("The variable `{name}` expects {expected}, but was given {actual}")]
    IncorrectTypeGivenForVariable {
        name: String,
        expected: Type,
        actual: Type,
        location: Location,
    },

    #[error("The member `{member}` expects {expected}, but was given {actual}")]
    IncorrectTypeGivenForMember {
        member: String,
        expected: Type,
        actual: Type,
        location: Location,
    },

    #[error("This function should return {expected}, but this statement returns {actual}")]
    UnmatchingReturnType {
        expected: Type,
        actual: Type,
        location: Location,
    },

    #[error("A for loop can only iterate over a List, but this expression has type {actual}")]
    ForExprNotArray { actual: Type, location: Location },

    #[error(
        "Every element of a list should have the type of the first element, {expected}, \
         but the {} element has type {actual}",
        nth(.position)
    )]
    ListElementsArentHomogeneous {
        /// 1-based position of the offending element
        position: usize,
        expected: Type,
        actual: Type,
        location: Location,
    },

    // ==================== Struct Members ====================

    #[error("{struct_name} should not have the member `{member}`")]
    ExtraMember {
        struct_name: String,
        member: String,
        location: Location,
    },

    #[error("{struct_name} is missing the member(s) {}", join_names(.members))]
    MissingMember {
        struct_name: String,
        members: Vec<String>,
        location: Location,
    },

    #[error("The member `{member}` is given more than once")]
    DuplicatedMember { member: String, location: Location },

    #[error("{struct_name} does not have the member `{member}`{}", did_you_mean(.suggestions))]
    AccessingInexistentMember {
        struct_name: String,
        member: String,
        suggestions: Vec<String>,
        location: Location,
    },

    #[error("Members can only be accessed on structs, but this expression has type {actual}")]
    AccessingMemberOfNonStruct { actual: Type, location: Location },

    // ==================== Calls ====================

    #[error(
        "No overload of `{signature}` accepts {actual} as its {} argument; declared types there are: {}",
        nth(.position),
        join_types(.candidates)
    )]
    NoConformingFunction {
        signature: String,
        /// 1-based parameter position
        position: usize,
        actual: Type,
        candidates: Vec<Type>,
        location: Location,
    },

    #[error("This expression returns {ty}, so its value must be assigned to a variable")]
    NonVoidExprNotAssignedToVariable { ty: Type, location: Location },

    // ==================== Collaborators ====================

    #[error("Cannot import `{filename}`")]
    ImportFail { filename: String, location: Location },

    #[error("Syntax error: {message}")]
    Syntax { message: String, location: Location },

    #[error("Internal compiler error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the location associated with this error
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::UsingUndefinedType { location, .. }
            | Self::UsingUndefinedGenericName { location, .. }
            | Self::UsingUndefinedStruct { location, .. }
            | Self::WrongNumberOfTypeArguments { location, .. }
            | Self::UsingUndefinedEnum { location, .. }
            | Self::UsingUndefinedVariable { location, .. }
            | Self::UsingUnknownFunction { location, .. }
            | Self::StructRedeclare { location, .. }
            | Self::EnumRedeclare { location, .. }
            | Self::GroupRedeclare { location, .. }
            | Self::BindingToNonGroup { location, .. }
            | Self::VariableRedeclare { location, .. }
            | Self::AssigningToImmutableVariable { location, .. }
            | Self::AssigningToUndefinedVariable { location, .. }
            | Self::AssigningVoidToVariable { location, .. }
            | Self::AssigningNullToUnnullableVariable { location, .. }
            | Self::IncorrectTypeGivenForVariable { location, .. }
            | Self::IncorrectTypeGivenForMember { location, .. }
            | Self::UnmatchingReturnType { location, .. }
            | Self::ForExprNotArray { location, .. }
            | Self::ListElementsArentHomogeneous { location, .. }
            | Self::ExtraMember { location, .. }
            | Self::MissingMember { location, .. }
            | Self::DuplicatedMember { location, .. }
            | Self::AccessingInexistentMember { location, .. }
            | Self::AccessingMemberOfNonStruct { location, .. }
            | Self::NoConformingFunction { location, .. }
            | Self::NonVoidExprNotAssignedToVariable { location, .. }
            | Self::ImportFail { location, .. }
            | Self::Syntax { location, .. } => Some(*location),
            Self::Internal(_) => None,
        }
    }

    /// Stable error code shown to the user
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccessingInexistentMember { .. } => "E0001",
            Self::AssigningToImmutableVariable { .. } => "E0002",
            Self::AssigningToUndefinedVariable { .. } => "E0003",
            Self::AssigningVoidToVariable { .. } => "E0004",
            Self::AssigningNullToUnnullableVariable { .. } => "E0005",
            Self::UsingUndefinedVariable { .. } => "E0006",
            Self::VariableRedeclare { .. } => "E0007",
            Self::IncorrectTypeGivenForVariable { .. } => "E0008",
            Self::UnmatchingReturnType { .. } => "E0009",
            Self::Syntax { .. } => "E0010",
            Self::NonVoidExprNotAssignedToVariable { .. } => "E0011",
            Self::NoConformingFunction { .. } => "E0012",
            Self::UsingUnknownFunction { .. } => "E0013",
            Self::UsingUndefinedType { .. } => "E0014",
            Self::UsingUndefinedStruct { .. } => "E0015",
            Self::UsingUndefinedEnum { .. } => "E0016",
            Self::StructRedeclare { .. } => "E0017",
            Self::EnumRedeclare { .. } => "E0018",
            Self::GroupRedeclare { .. } => "E0019",
            Self::ExtraMember { .. } => "E0020",
            Self::MissingMember { .. } => "E0021",
            Self::DuplicatedMember { .. } => "E0022",
            Self::IncorrectTypeGivenForMember { .. } => "E0023",
            Self::ListElementsArentHomogeneous { .. } => "E0024",
            Self::UsingUndefinedGenericName { .. } => "E0025",
            Self::ForExprNotArray { .. } => "E0026",
            Self::AccessingMemberOfNonStruct { .. } => "E0027",
            Self::BindingToNonGroup { .. } => "E0028",
            Self::WrongNumberOfTypeArguments { .. } => "E0029",
            Self::ImportFail { .. } => "E0030",
            Self::Internal(_) => "E9999",
        }
    }

    /// Name of the error kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::UsingUndefinedType { .. } => "UsingUndefinedType",
            Self::UsingUndefinedGenericName { .. } => "UsingUndefinedGenericName",
            Self::UsingUndefinedStruct { .. } => "UsingUndefinedStruct",
            Self::UsingUndefinedEnum { .. } => "UsingUndefinedEnum",
            Self::UsingUndefinedVariable { .. } => "UsingUndefinedVariable",
            Self::UsingUnknownFunction { .. } => "UsingUnknownFunction",
            Self::StructRedeclare { .. } => "StructRedeclare",
            Self::EnumRedeclare { .. } => "EnumRedeclare",
            Self::GroupRedeclare { .. } => "GroupRedeclare",
            Self::BindingToNonGroup { .. } => "BindingToNonGroup",
            Self::WrongNumberOfTypeArguments { .. } => "WrongNumberOfTypeArguments",
            Self::VariableRedeclare { .. } => "VariableRedeclare",
            Self::AssigningToImmutableVariable { .. } => "AssigningToImmutableVariable",
            Self::AssigningToUndefinedVariable { .. } => "AssigningToUndefinedVariable",
            Self::AssigningVoidToVariable { .. } => "AssigningVoidToVariable",
            Self::AssigningNullToUnnullableVariable { .. } => "AssigningNullToUnnullableVariable",
            Self::IncorrectTypeGivenForVariable { .. } => "IncorrectTypeGivenForVariable",
            Self::IncorrectTypeGivenForMember { .. } => "IncorrectTypeGivenForMember",
            Self::UnmatchingReturnType { .. } => "UnmatchingReturnType",
            Self::ForExprNotArray { .. } => "ForExprNotArray",
            Self::ListElementsArentHomogeneous { .. } => "ListElementsArentHomogeneous",
            Self::ExtraMember { .. } => "ExtraMember",
            Self::MissingMember { .. } => "MissingMember",
            Self::DuplicatedMember { .. } => "DuplicatedMember",
            Self::AccessingInexistentMember { .. } => "AccessingInexistentMember",
            Self::AccessingMemberOfNonStruct { .. } => "AccessingMemberOfNonStruct",
            Self::NoConformingFunction { .. } => "NoConformingFunction",
            Self::NonVoidExprNotAssignedToVariable { .. } => "NonVoidExprNotAssignedToVariable",
            Self::ImportFail { .. } => "ImportFail",
            Self::Syntax { .. } => "Syntax",
            Self::Internal(_) => "Internal",
        }
    }

    /// Names offered as replacements, if any
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::UsingUndefinedType { suggestions, .. }
            | Self::UsingUndefinedGenericName { suggestions, .. }
            | Self::UsingUndefinedVariable { suggestions, .. }
            | Self::AccessingInexistentMember { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// Remediation hint shown under the rendered error
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::AssigningToImmutableVariable { name, .. } => Some(format!(
                "Variables are immutable unless declared with the `mutable` keyword, e.g.\n\n    let mutable {} = ...",
                name
            )),
            Self::AssigningNullToUnnullableVariable { expected, .. } => Some(format!(
                "Mark the type as nullable to allow nil, e.g. `{}?`",
                expected
            )),
            Self::ListElementsArentHomogeneous { .. } => Some(
                "Use a tuple if the elements should have different types, e.g.\n\n    let myTuple = (1, \"2\", 3)"
                    .to_string(),
            ),
            Self::NonVoidExprNotAssignedToVariable { .. } => {
                Some("Bind the value with `let`, e.g.\n\n    let result = ...".to_string())
            }
            Self::MissingMember { members, .. } => Some(format!(
                "Add the missing member(s):\n\n{}",
                members.iter().map(|m| format!("    :{} = ...", m)).collect::<Vec<_>>().join("\n")
            )),
            Self::Internal(_) => Some("This is possibly a compiler bug; please report it.".to_string()),
            _ => None,
        }
    }

    /// Internal errors are compiler defects rather than user mistakes
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// An error paired with the file it was raised in
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct Diagnostic {
    pub error: Error,
    pub file: SourceFile,
}

impl Diagnostic {
    pub fn new(error: Error, file: &SourceFile) -> Self {
        Self { error, file: file.clone() }
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => format!(". Did you mean `{}`?", only),
        many => format!(
            ". Did you mean one of {}?",
            many.iter().map(|s| format!("`{}`", s)).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn join_names(names: &[String]) -> String {
    names.iter().map(|n| format!("`{}`", n)).collect::<Vec<_>>().join(", ")
}

fn nth(position: &usize) -> String {
    ordinal(*position)
}

fn join_types(types: &[Type]) -> String {
    types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

/// English ordinal for a 1-based position
pub fn ordinal(position: usize) -> String {
    const WORDS: [&str; 10] = [
        "first", "second", "third", "fourth", "fifth",
        "sixth", "seventh", "eighth", "ninth", "tenth",
    ];
    if (1..=WORDS.len()).contains(&position) {
        return WORDS[position - 1].to_string();
    }
    let suffix = match (position % 10, position % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", position, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuiltinKind, Type};

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "first");
        assert_eq!(ordinal(2), "second");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(103), "103rd");
    }

    #[test]
    fn test_list_error_message() {
        let error = Error::ListElementsArentHomogeneous {
            position: 2,
            expected: Type::builtin(BuiltinKind::Integer),
            actual: Type::builtin(BuiltinKind::String),
            location: Location::line(3, 9, 16),
        };
        let message = error.to_string();
        assert!(message.contains("second element"));
        assert!(message.contains("Integer"));
        assert_eq!(error.code(), "E0024");
        assert!(error.hint().is_some());
    }

    #[test]
    fn test_suggestions_are_listed() {
        let error = Error::UsingUndefinedType {
            name: "Numbr".to_string(),
            suggestions: vec!["Number".to_string()],
            location: Location::dummy(),
        };
        assert_eq!(error.to_string(), "The type `Numbr` is not defined. Did you mean `Number`?");
        assert_eq!(error.suggestions(), ["Number".to_string()]);
    }

    #[test]
    fn test_internal_has_no_location() {
        let error = Error::Internal("lost struct".to_string());
        assert!(error.is_internal());
        assert_eq!(error.location(), None);
    }
}
