// THEORY:
// The `ProcessingContext` is the explicit stand-in for a reusable image-processing
// context. It owns the kernel set a pipeline run needs and nothing else: no
// caches, no scratch buffers, no interior mutability. Callers either create one
// per invocation (what the free functions in `pipeline` do) or share one behind
// an `Arc` across threads, which is safe because it is `Send + Sync` and
// immutable.

use crate::core_modules::grayscale::GrayscaleKernel;
use crate::core_modules::hsv_glare::HsvGlareKernel;
use crate::core_modules::range_clamp::RangeClampKernel;
use crate::core_modules::sobel::SobelKernel;

/// The compute backend a context dispatches kernels to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Reference implementation on the calling thread.
    #[default]
    Cpu,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    backend: Backend,
    pub(crate) grayscale: GrayscaleKernel,
    pub(crate) clamp: RangeClampKernel,
    pub(crate) hsv: HsvGlareKernel,
    pub(crate) sobel: SobelKernel,
}

impl ProcessingContext {
    /// A context backed by the CPU reference kernels.
    pub fn cpu() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_shareable<T: Send + Sync + 'static>() {}

    #[test]
    fn context_can_cross_threads() {
        assert_shareable::<ProcessingContext>();
        assert_eq!(ProcessingContext::cpu().backend(), Backend::Cpu);
    }
}
