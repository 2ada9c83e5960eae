//! Compile-time quasiquotes for TypeScript syntax trees.
//!
//! A tagged template written with the `tsc` tag from `ts-transform-creator`
//! is replaced at compile time by a function that rebuilds the quoted syntax
//! through factory calls:
//!
//! ```text
//! import { tsc } from "ts-transform-creator";
//!
//! export const create = tsc<{ name: string }>`console.log(${(props) =>
//!     ts.createStringLiteral("Hello, " + props.name)})`;
//! ```
//!
//! becomes
//!
//! ```text
//! export const create = (props) => ts.createCallExpression(
//!     ts.createPropertyAccessExpression(ts.createIdentifier("console"), ts.createIdentifier("log")),
//!     [],
//!     [((props) => ts.createStringLiteral("Hello, " + props.name))(props)]);
//! ```
//!
//! # Architecture
//!
//! - [`compiler`] - lexer, parser and printer for the host language, over
//!   the uniform tree in [`syntax`]
//! - [`semantic`] and [`types`] - binding and the type oracle the transform
//!   queries
//! - [`locate`] - which tagged templates are use sites
//! - [`template`] - template compilation, builder-call synthesis and
//!   placeholder splicing
//! - [`driver`] - the per-file pass and replacement assembly
//!
//! # Example
//!
//! ```
//! use ts_transform_creator::{Program, TransformOptions, transform_program};
//!
//! let program = Program::single(
//!     "greeting.ts",
//!     r#"import { tsc } from "ts-transform-creator"; export const greeting = tsc`"Hello"`;"#,
//! )
//! .unwrap();
//! let outcomes = transform_program(&program, &TransformOptions::default());
//! let output = outcomes[0].result.as_ref().unwrap().print();
//! assert!(output.contains(r#"(props) => ts.createStringLiteral("Hello", false)"#));
//! ```

pub mod compiler;
pub mod config;
pub mod ctxt;
pub mod diagnostics;
pub mod driver;
pub mod factory;
pub mod locate;
pub mod query;
pub mod ret_type;
pub mod semantic;
pub mod syntax;
pub mod template;
pub mod types;

pub use config::{ModuleFormat, TransformOptions};
pub use ctxt::{StructuralRole, TransformContext};
pub use diagnostics::{Diagnostic, DiagnosticKind, Location, Severity};
pub use driver::{
    FileOutcome, FileOutput, TransformError, TransformErrorKind, transform_file,
    transform_program, transform_program_with_ids,
};
pub use semantic::{Program, ProgramFile, SemanticModel};
pub use syntax::{Field, Node, SyntaxKind};
pub use template::{Cuid2Ids, IdGenerator, SequentialIds};
pub use types::{ProgramTypes, Type, TypeOracle};
