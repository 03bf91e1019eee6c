#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

impl TextureHandle {
    pub fn index(self) -> usize {
        self.0
    }
}
