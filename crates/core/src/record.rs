/// Contract every listed record satisfies: a stable id.
///
/// The controller is parametric over the record type and assumes nothing
/// beyond this — selection and bulk writes address records by id only.
pub trait Record {
    fn id(&self) -> &str;
}
