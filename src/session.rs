//! An editing session: a read-only reference airfoil and the list of designs derived from it.

use crate::airfoil::common::GeometryParams;
use crate::airfoil::Airfoil;
use crate::errors::{Result, Status};
use crate::ops::{apply, Operation};
use tracing::{info, warn};

/// One step of a session, the airfoil together with the operation which produced it
#[derive(Debug, Clone)]
pub struct Design {
    pub airfoil: Airfoil,

    /// None for the initial design
    pub operation: Option<Operation>,

    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct Session {
    reference: Airfoil,
    designs: Vec<Design>,
    params: GeometryParams,
}

impl Session {
    /// Starts a session whose first design is the normalized reference
    pub fn new(reference: Airfoil, params: GeometryParams) -> Result<Self> {
        let first = apply(&reference, &Operation::Normalize, &params)?;
        Ok(Session {
            designs: vec![Design {
                airfoil: first.value,
                operation: None,
                status: first.status,
            }],
            reference,
            params,
        })
    }

    pub fn reference(&self) -> &Airfoil {
        &self.reference
    }

    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    pub fn params(&self) -> &GeometryParams {
        &self.params
    }

    pub fn set_params(&mut self, params: GeometryParams) {
        self.params = params;
    }

    pub fn current(&self) -> &Design {
        // A session always holds its initial design
        &self.designs[self.designs.len() - 1]
    }

    /// Applies an operation to the current design and appends the result. On failure the
    /// session is left unchanged and the error is returned.
    pub fn apply(&mut self, operation: Operation) -> Result<&Design> {
        let result = apply(&self.current().airfoil, &operation, &self.params);
        match result {
            Ok(outcome) => {
                if let Status::Warning(w) = outcome.status {
                    warn!(operation = operation.name(), warning = ?w, "design created with warning");
                } else {
                    info!(operation = operation.name(), designs = self.designs.len() + 1, "design created");
                }
                self.designs.push(Design {
                    airfoil: outcome.value,
                    operation: Some(operation),
                    status: outcome.status,
                });
                Ok(self.current())
            }
            Err(e) => {
                warn!(operation = operation.name(), error = %e, "operation failed, design kept");
                Err(e)
            }
        }
    }

    /// Removes the latest design. The initial design cannot be removed.
    pub fn undo(&mut self) -> Option<Design> {
        if self.designs.len() > 1 {
            self.designs.pop()
        } else {
            None
        }
    }
}
