//! Semantic hooks over a parsed program.
//!
//! Only type well-formedness is checked here: every type annotation slot in
//! the tree is re-validated and violations are logged. Later stages (full
//! inference, code generation) plug into the same visitor.

use crate::ast::visitor::{walk_program, Visitor};
use crate::ast::{Program, Type};
use crate::diagnostics::SharedLogger;
use crate::typechecker::validate;

struct TypeWellFormedness {
    logger: SharedLogger,
}

impl Visitor for TypeWellFormedness {
    fn visit_type(&mut self, ty: &Type) {
        if let Err(err) = validate(ty) {
            let msg = format!("{}: error: {err}", err.pos());
            self.logger.borrow_mut().error(msg);
        }
    }
}

/// Validate every type annotation in `program`, logging violations.
pub fn analyze(program: &Program, logger: &SharedLogger) {
    let mut checker = TypeWellFormedness {
        logger: logger.clone(),
    };
    walk_program(&mut checker, program);
}
