/// Anything the world should tick alongside its chunks.
pub trait Entity: Send {
    fn think(&mut self, dt: f32);
}
