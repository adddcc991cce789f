use plane_core::plane::{Attributes, Capabilities, DerivationStep, Inconsistency, Row, SnapPoint};
use plane_core::{EntityId, Plane, PlaneError};
use serde::{Deserialize, Serialize};

/// One websocket text frame, decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddPoint { pos: [f64; 2] },
    AddLine { from: [f64; 2], to: [f64; 2] },
    Remove { id: EntityId },
    SetKnown { id: EntityId },
    SetFixed { id: EntityId },
    SetUnknown { id: EntityId },
    ResetDerived,
    SetValue { id: EntityId, value: f64 },
    Drag { moves: Vec<(EntityId, [f64; 2])> },
    Snap {
        cursor: [f64; 2],
        radius: Option<f64>,
        #[serde(default)]
        draggable: bool,
    },
    Capabilities { id: EntityId },
    Derivation { id: EntityId },
    Attributes { id: EntityId },
    Consistency,
    Rows,
}

impl Command {
    /// Commands that change the plane; the session answers them with a fresh table.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::Snap { .. }
                | Command::Capabilities { .. }
                | Command::Derivation { .. }
                | Command::Attributes { .. }
                | Command::Consistency
                | Command::Rows
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Reply {
    Created(EntityId),
    Done,
    Snap(Option<SnapPoint>),
    Capabilities(Capabilities),
    Derivation(Vec<DerivationStep>),
    Attributes(Attributes),
    Consistency(Vec<Inconsistency>),
    Rows(Vec<Row>),
}

pub fn execute(plane: &mut Plane, command: Command) -> Result<Reply, PlaneError> {
    let reply = match command {
        Command::AddPoint { pos } => Reply::Created(plane.add_point(pos)),
        Command::AddLine { from, to } => Reply::Created(plane.add_line(from, to)),
        Command::Remove { id } => {
            plane.remove(id)?;
            Reply::Done
        }
        Command::SetKnown { id } => {
            plane.set_known(id)?;
            Reply::Done
        }
        Command::SetFixed { id } => {
            plane.set_fixed(id)?;
            Reply::Done
        }
        Command::SetUnknown { id } => {
            plane.set_unknown(id)?;
            Reply::Done
        }
        Command::ResetDerived => {
            plane.reset_derived();
            Reply::Done
        }
        Command::SetValue { id, value } => {
            plane.set_value(id, value)?;
            Reply::Done
        }
        Command::Drag { moves } => {
            plane.drag(&moves)?;
            Reply::Done
        }
        Command::Snap { cursor, radius, draggable } => {
            if draggable {
                Reply::Snap(plane.nearest_draggable_point(cursor, radius))
            } else {
                Reply::Snap(plane.nearest_snap_point(cursor, radius))
            }
        }
        Command::Capabilities { id } => Reply::Capabilities(plane.capabilities(id)?),
        Command::Derivation { id } => Reply::Derivation(plane.derivation(id)?),
        Command::Attributes { id } => Reply::Attributes(plane.attributes(id)?),
        Command::Consistency => Reply::Consistency(plane.check_consistency()),
        Command::Rows => Reply::Rows(plane.rows()),
    };
    Ok(reply)
}

/// Short machine-readable code for an engine error.
pub fn error_code(error: &PlaneError) -> &'static str {
    match error {
        PlaneError::NotFound(_) => "NOT_FOUND",
        PlaneError::WrongKind { .. } => "WRONG_KIND",
        PlaneError::NotAllowed { .. } => "NOT_ALLOWED",
        PlaneError::Fixed(_) => "FIXED",
        PlaneError::Attribute { .. } => "BAD_ATTRIBUTE",
        PlaneError::Formula(_) => "BAD_FORMULA",
    }
}
