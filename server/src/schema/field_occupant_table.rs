use spacetimedb::*;

/// One agent inside one gravity source's field.
///
/// Mirrors `shared::FieldOccupancy`. Rows are written only by `upload_move` and agent
/// cleanup, so the table has a single writer per agent.
#[table(name = field_occupant, public)]
pub struct FieldOccupant {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    /// Packed `SourceHandle`.
    #[index(btree)]
    pub source: u64,

    #[index(btree)]
    pub agent_id: u64,
}
