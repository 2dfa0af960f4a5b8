/// Identity keys seen so far this session. Grows monotonically.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityRepository: Send + Sync {
    fn mark_known(&mut self, keys: &[String]);
    fn get_unknown(&self, keys: &[String]) -> Vec<String>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
