/// Receives re-render requests from state setters.
///
/// Implemented by the root mount. A request made while a render is already in
/// progress must be deferred until that render completes.
pub trait RenderScheduler {
    fn request_render(&self);
}
