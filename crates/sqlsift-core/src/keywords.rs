//! SQL keyword table.
//!
//! Only the keywords the clause scanners need to recognize are listed;
//! anything else is treated as an ordinary identifier.

/// SQL keywords recognized by the clause scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Clause heads
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Limit,
    Offset,
    Distinct,
    All,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,
    Using,
    Union,

    // DML / DDL
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Create,
    Table,
    If,
    Exists,

    // Operators and predicates
    As,
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Is,
    Null,
    True,
    False,

    // CASE expressions
    Case,
    When,
    Then,
    Else,
    End,

    // Ordering and windowing
    Asc,
    Desc,
    With,
    Recursive,
    Over,
    Partition,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait, clippy::too_many_lines)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "GROUP" => Some(Self::Group),
            "BY" => Some(Self::By),
            "HAVING" => Some(Self::Having),
            "ORDER" => Some(Self::Order),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "DISTINCT" => Some(Self::Distinct),
            "ALL" => Some(Self::All),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            "OUTER" => Some(Self::Outer),
            "CROSS" => Some(Self::Cross),
            "ON" => Some(Self::On),
            "USING" => Some(Self::Using),
            "UNION" => Some(Self::Union),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "CREATE" => Some(Self::Create),
            "TABLE" => Some(Self::Table),
            "IF" => Some(Self::If),
            "EXISTS" => Some(Self::Exists),
            "AS" => Some(Self::As),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "IS" => Some(Self::Is),
            "NULL" => Some(Self::Null),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "WITH" => Some(Self::With),
            "RECURSIVE" => Some(Self::Recursive),
            "OVER" => Some(Self::Over),
            "PARTITION" => Some(Self::Partition),
            _ => None,
        }
    }

    /// Returns true if the string is a recognized keyword.
    #[must_use]
    pub fn is_keyword(s: &str) -> bool {
        Self::from_str(s).is_some()
    }
}
