use wcm_codec::ColumnType;

use crate::decl::TableDecl;

/// An application type that maps to one row of a wide-column table.
///
/// All implementations must satisfy these invariants:
/// - `declare()` returns the same declaration on every call. The registry
///   calls it once per type and caches the validated result.
/// - `compose_row_key()` derives the key from the record's own fields and
///   does not mutate anything.
/// - `parse_row_key()` is the inverse of `compose_row_key()` for the identity
///   fields it populates.
///
/// ```ignore
/// impl Record for Employee {
///     type RowKey = String;
///
///     fn declare() -> TableDecl<Self> {
///         TableDecl::new("employees")
///             .family("main", 1)
///             .constructor(|| Ok(Employee::default()))
///             .row_key("emp_id")
///             .field("emp_id")
///             .column(Column::new("name", "main", "name"), |e| &e.name, |e| &mut e.name)
///     }
///
///     fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
///         Ok(self.emp_id.map(|id| id.to_string()))
///     }
///
///     fn parse_row_key(&mut self, key: String) -> anyhow::Result<()> {
///         self.emp_id = Some(key.parse()?);
///         Ok(())
///     }
/// }
/// ```
pub trait Record: Sized + Send + Sync + 'static {
    /// Type the row key is encoded from and decoded into.
    type RowKey: ColumnType;

    /// The table, column families and field bindings of this type.
    fn declare() -> TableDecl<Self>;

    /// Build this record's row key. `Ok(None)` means the key is missing.
    fn compose_row_key(&self) -> anyhow::Result<Option<Self::RowKey>>;

    /// Populate identity fields from a decoded row key.
    fn parse_row_key(&mut self, key: Self::RowKey) -> anyhow::Result<()>;
}
