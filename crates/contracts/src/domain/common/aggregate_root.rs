use super::EntityMetadata;

/// Aggregate root: instance accessors plus static naming used for tables and logs
pub trait AggregateRoot {
    type Id;

    fn id(&self) -> Self::Id;

    /// Business code of the record (part number, serial number, generated code)
    fn code(&self) -> &str;

    fn description(&self) -> &str;

    fn metadata(&self) -> &EntityMetadata;

    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Aggregate index, e.g. "a003"
    fn aggregate_index() -> &'static str;

    /// Collection name, e.g. "part"
    fn collection_name() -> &'static str;

    /// Singular UI name
    fn element_name() -> &'static str;

    /// Plural UI name
    fn list_name() -> &'static str;

    /// Full system name, e.g. "a003_part". Also the table name.
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
