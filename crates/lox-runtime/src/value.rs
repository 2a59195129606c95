//! Runtime values and errors

use crate::ast::FunctionExpr;
use crate::diagnostic::{error_codes, Anchor, Diagnostic};
use crate::environment::EnvRef;
use crate::span::Span;
use std::fmt;
use std::rc::Rc;

/// Native function signature
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, NativeError>>;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Callable(Rc<Callable>),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// `nil`, `false` and `0` are falsy; everything else is truthy
    ///
    /// Only positive zero counts as `0`: `-0` is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.to_bits() != 0.0f64.to_bits(),
            Value::String(_) | Value::Callable(_) => true,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Callable(_) => "function",
        }
    }
}

/// Value equality
///
/// Numbers with identical bit patterns are equal, so a NaN equals itself.
/// Callables are equal only to themselves.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Callable(callable) => write!(f, "{}", callable),
        }
    }
}

/// Render a number the way `print` shows it
///
/// Integral numbers print without a trailing `.0`; infinities print as
/// `Infinity` and `-Infinity`.
pub fn format_number(n: f64) -> String {
    if n.is_infinite() {
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Anything that can be called
pub enum Callable {
    Function(Function),
    Native(NativeFunction),
}

impl Callable {
    /// Exact number of arguments required
    pub fn arity(&self) -> usize {
        match self {
            Callable::Function(func) => func.declaration.params.len(),
            Callable::Native(native) => native.arity,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(Function { name: Some(name), .. }) => write!(f, "<fn {}>", name),
            Callable::Function(_) => write!(f, "<fn>"),
            Callable::Native(native) => write!(f, "<native fn {}>", native.name),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Closures may reach themselves through their environment
        write!(f, "{}", self)
    }
}

/// User-defined function: a definition closed over its environment
pub struct Function {
    /// Set for named declarations
    pub name: Option<String>,
    pub declaration: Rc<FunctionExpr>,
    pub closure: EnvRef,
}

/// Host-provided function
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(&[Value]) -> Result<Value, NativeError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Rc::new(func),
        }
    }
}

/// Failure raised by a native function
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NativeError {
    /// Argument of the wrong type
    #[error("{0}")]
    TypeError(String),
    /// Argument of the right type but unusable value
    #[error("{0}")]
    ValueError(String),
}

/// Where a runtime error happened
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSite {
    /// Line of the offending token
    pub line: usize,
    /// Lexeme of the offending token
    pub lexeme: String,
    pub span: Span,
    /// Rendering of the offending expression, when there is one
    pub context: Option<String>,
}

/// Runtime error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// Operand of the wrong type
    #[error("{msg}")]
    TypeError { msg: String, site: ErrorSite },
    /// Assignment to a global that was never declared
    #[error("Undefined variable '{name}'.")]
    UndefinedVariable { name: String, site: ErrorSite },
    /// Read of a name with no value
    #[error("Variable '{name}' used before assignment.")]
    UnassignedVariable { name: String, site: ErrorSite },
    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch {
        expected: usize,
        got: usize,
        site: ErrorSite,
    },
    #[error("Can only call functions and classes.")]
    NotCallable { site: ErrorSite },
    /// Call nesting went past the interpreter's limit
    #[error("Stack overflow.")]
    StackOverflow { site: ErrorSite },
    /// A native function failed
    #[error("{source}")]
    Native {
        #[source]
        source: NativeError,
        site: ErrorSite,
    },
    /// Evaluation reached code that failed to parse
    #[error("Cannot evaluate code that failed to parse: {msg}")]
    Malformed { msg: String, site: ErrorSite },
}

impl RuntimeError {
    /// Get the location of this error
    pub fn site(&self) -> &ErrorSite {
        match self {
            RuntimeError::TypeError { site, .. }
            | RuntimeError::UndefinedVariable { site, .. }
            | RuntimeError::UnassignedVariable { site, .. }
            | RuntimeError::ArityMismatch { site, .. }
            | RuntimeError::NotCallable { site }
            | RuntimeError::StackOverflow { site }
            | RuntimeError::Native { site, .. }
            | RuntimeError::Malformed { site, .. } => site,
        }
    }

    /// Diagnostic code for this error
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::TypeError { .. } => error_codes::TYPE_ERROR,
            RuntimeError::UndefinedVariable { .. } => error_codes::UNDEFINED_VARIABLE,
            RuntimeError::UnassignedVariable { .. } => error_codes::UNASSIGNED_VARIABLE,
            RuntimeError::ArityMismatch { .. } => error_codes::ARITY_MISMATCH,
            RuntimeError::NotCallable { .. } => error_codes::NOT_CALLABLE,
            RuntimeError::StackOverflow { .. } => error_codes::STACK_OVERFLOW,
            RuntimeError::Native { .. } => error_codes::NATIVE_ERROR,
            RuntimeError::Malformed { .. } => error_codes::GENERIC_ERROR,
        }
    }

    /// Convert to a diagnostic anchored at the offending token
    pub fn to_diagnostic(&self) -> Diagnostic {
        let site = self.site();
        let mut diag = Diagnostic::error_with_code(self.code(), self.to_string(), site.span)
            .with_line(site.line)
            .with_anchor(Anchor::AtLexeme(site.lexeme.clone()))
            .with_label("runtime error");
        if let Some(context) = &site.context {
            diag = diag.with_note(format!("in {}", context));
        }
        diag
    }
}
