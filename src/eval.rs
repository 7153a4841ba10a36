//! Tree-walking evaluator.
//!
//! Executes statements against a chain of lexically scoped environments,
//! writing `print` output to a caller-supplied sink. `return` is modeled as
//! a control-flow result variant that statements propagate upward until a
//! call site consumes it, rather than as a host-level exception.

use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::{BinOp, Expr, LiteralValue, Stmt, UnaryOp};
use crate::intern::Symbol;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Closure(Rc<Closure>),
}

/// A function value: formal parameters, a body, and the environment captured
/// at the point of declaration.
pub struct Closure {
    pub name: Symbol,
    params: Rc<Vec<Symbol>>,
    body: Rc<Stmt>,
    env: Rc<Env>,
}

// The captured environment is omitted: a closure stored in its own capture
// scope would otherwise send Debug into a cycle.
impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Closure(l), Value::Closure(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl Value {
    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            // Integral numbers print without a decimal point, unlike the
            // token-literal form produced by the scanner.
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Closure(c) => write!(f, "<fn {}>", c.name),
        }
    }
}

/// Outcome of executing a statement.
enum Flow {
    Normal,
    Return(Value),
}

#[derive(Debug)]
pub enum RuntimeError {
    DivisionByZero,
    ExpectedNumber,
    AddMismatch,
    UndefinedVariable(String),
    NotCallable,
    WrongArgumentCount,
    TopLevelReturn,
    Io(io::Error),
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::DivisionByZero => write!(f, "Division by zero"),
            RuntimeError::ExpectedNumber => write!(f, "Expected number"),
            RuntimeError::AddMismatch => write!(f, "Can only add numbers or strings"),
            RuntimeError::UndefinedVariable(name) => {
                write!(f, "Undefined variable: \"{}\"", name)
            }
            RuntimeError::NotCallable => write!(f, "Callee must be a function."),
            RuntimeError::WrongArgumentCount => write!(f, "Incorrect number of arguments."),
            RuntimeError::TopLevelReturn => write!(f, "Cannot return from top-level code."),
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> RuntimeError {
        RuntimeError::Io(e)
    }
}

/// Executes statements against a global environment that lives as long as
/// the evaluator, so successive [`Evaluator::interpret`] calls share state.
#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    globals: Rc<Env>,
}

impl<'a, W: Write> Evaluator<'a, W> {
    /// Creates an evaluator with a fresh global environment.
    pub fn new(output: &'a mut W) -> Evaluator<'a, W> {
        Evaluator {
            output,
            globals: Env::new(),
        }
    }

    /// Execute the statements in order, stopping at the first runtime error.
    ///
    /// A `return` that reaches the top level is a runtime error.
    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        match self.eval_stmts(stmts, self.globals.clone())? {
            Flow::Normal => Ok(()),
            Flow::Return(_) => Err(RuntimeError::TopLevelReturn),
        }
    }

    /// Evaluate a single expression against the global environment.
    pub fn eval_expression(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.eval_expr(expr, self.globals.clone())
    }

    fn eval_stmts(&mut self, stmts: &[Stmt], env: Rc<Env>) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            match self.eval_stmt(stmt, env.clone())? {
                Flow::Normal => (),
                ret => return Ok(ret),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: Rc<Env>) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expr(e) => {
                self.eval_expr(e, env)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(e) => {
                let v = self.eval_expr(e, env)?;
                writeln!(self.output, "{}", v)?;
                Ok(Flow::Normal)
            }
            Stmt::VarDecl(name, init) => {
                let val = match init {
                    Some(e) => self.eval_expr(e, env.clone())?,
                    None => Value::Nil,
                };
                env.declare(name, val);
                Ok(Flow::Normal)
            }
            Stmt::FunDecl(name, params, body) => {
                let closure = Closure {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    env: env.clone(),
                };
                env.declare(name, Value::Closure(Rc::new(closure)));
                Ok(Flow::Normal)
            }
            Stmt::Block(stmts) => self.eval_stmts(stmts, Env::with_parent(env)),
            Stmt::If(cond, then_branch, else_branch) => {
                if self.eval_expr(cond, env.clone())?.is_truthy() {
                    self.eval_stmt(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.eval_stmt(else_branch, env)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(cond, body) => {
                while self.eval_expr(cond, env.clone())?.is_truthy() {
                    match self.eval_stmt(body, env.clone())? {
                        Flow::Normal => (),
                        ret => return Ok(ret),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return(e) => Ok(Flow::Return(self.eval_expr(e, env)?)),
        }
    }

    fn eval_expr(&mut self, expr: &Expr, env: Rc<Env>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(match lit {
                LiteralValue::Nil => Value::Nil,
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::Str(Rc::from(s.as_str())),
            }),
            Expr::Group(e) => self.eval_expr(e, env),
            Expr::Variable(name) => env
                .get(name)
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.name().to_owned())),
            Expr::Assign(name, rhs) => {
                let val = self.eval_expr(rhs, env.clone())?;
                env.assign(name, val.clone())?;
                Ok(val)
            }
            Expr::Unary(UnaryOp::Not, child) => {
                let v = self.eval_expr(child, env)?;
                Ok(Value::Bool(!v.is_truthy()))
            }
            Expr::Unary(UnaryOp::Neg, child) => match self.eval_expr(child, env)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::ExpectedNumber),
            },
            Expr::Binary(BinOp::And, lhs, rhs) => {
                let left = self.eval_expr(lhs, env.clone())?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval_expr(rhs, env)
            }
            Expr::Binary(BinOp::Or, lhs, rhs) => {
                let left = self.eval_expr(lhs, env.clone())?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval_expr(rhs, env)
            }
            Expr::Binary(op, lhs, rhs) => {
                let left = self.eval_expr(lhs, env.clone())?;
                let right = self.eval_expr(rhs, env)?;
                eval_binary(*op, left, right)
            }
            Expr::Call(callee, args) => {
                let callee = self.eval_expr(callee, env.clone())?;
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval_expr(arg, env.clone())?);
                }
                self.call(callee, evaluated)
            }
        }
    }

    /// Bind arguments in a fresh scope under the closure's captured
    /// environment and run the body. The call's result is the value carried
    /// by a `return`, or `nil` if the body completes without one.
    fn call(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let closure = match callee {
            Value::Closure(c) => c,
            _ => return Err(RuntimeError::NotCallable),
        };
        if args.len() != closure.params.len() {
            return Err(RuntimeError::WrongArgumentCount);
        }

        let call_env = Env::with_parent(closure.env.clone());
        for (param, arg) in closure.params.iter().zip(args) {
            call_env.declare(param, arg);
        }
        match self.eval_stmt(&closure.body, call_env)? {
            Flow::Return(v) => Ok(v),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

fn eval_binary(op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(format!("{}{}", l, r).into())),
            _ => Err(RuntimeError::AddMismatch),
        },
        BinOp::Sub => {
            let (l, r) = number_operands(left, right)?;
            Ok(Value::Number(l - r))
        }
        BinOp::Mul => {
            let (l, r) = number_operands(left, right)?;
            Ok(Value::Number(l * r))
        }
        BinOp::Div => {
            let (l, r) = number_operands(left, right)?;
            if r == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Number(l / r))
            }
        }
        BinOp::Greater => {
            let (l, r) = number_operands(left, right)?;
            Ok(Value::Bool(l > r))
        }
        BinOp::GreaterEqual => {
            let (l, r) = number_operands(left, right)?;
            Ok(Value::Bool(l >= r))
        }
        BinOp::Less => {
            let (l, r) = number_operands(left, right)?;
            Ok(Value::Bool(l < r))
        }
        BinOp::LessEqual => {
            let (l, r) = number_operands(left, right)?;
            Ok(Value::Bool(l <= r))
        }
        BinOp::Equal => Ok(Value::Bool(left == right)),
        BinOp::NotEqual => Ok(Value::Bool(left != right)),
        BinOp::And | BinOp::Or => unreachable!("short-circuit operators never reach eval_binary"),
    }
}

fn number_operands(left: Value, right: Value) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((l, r)),
        _ => Err(RuntimeError::ExpectedNumber),
    }
}

/// A lexical scope: bindings plus an optional parent, forming a chain.
///
/// Lookup walks the chain innermost-first. Declaration always writes the
/// innermost scope, shadowing outer bindings. Assignment updates the scope
/// where the name was declared and fails if there is none.
#[derive(Debug)]
struct Env {
    parent: Option<Rc<Env>>,
    bindings: RefCell<HashMap<Symbol, Value>>,
}

impl Env {
    fn new() -> Rc<Env> {
        Rc::new(Env {
            parent: None,
            bindings: RefCell::new(HashMap::new()),
        })
    }

    fn with_parent(parent: Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            parent: Some(parent),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    fn declare(&self, name: &Symbol, val: Value) {
        self.bindings.borrow_mut().insert(name.clone(), val);
    }

    fn assign(&self, name: &Symbol, val: Value) -> Result<(), RuntimeError> {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(slot) = bindings.get_mut(name) {
            *slot = val;
            Ok(())
        } else if let Some(parent) = self.parent.as_ref() {
            drop(bindings);
            parent.assign(name, val)
        } else {
            Err(RuntimeError::UndefinedVariable(name.name().to_owned()))
        }
    }

    fn get(&self, name: &Symbol) -> Option<Value> {
        match self.bindings.borrow().get(name) {
            Some(v) => Some(v.clone()),
            None => self.parent.as_ref().and_then(|p| p.get(name)),
        }
    }
}
