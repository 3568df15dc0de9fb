/// Plane sets and the shared depth/stencil splitting routine
///
/// Clear, blit and invalidate all face the same problem: a request may name
/// only one plane of a combined depth-stencil surface while the backend can
/// only operate on both. `plan_depth_stencil` decides what to do, and
/// `apply_depth_stencil_plan` carries the decision out around the caller's
/// backend operation.

use bitflags::bitflags;
use crate::device::{Device, RenderTarget};
use crate::error::{Error, Result};
use super::Rect;

bitflags! {
    /// Image planes taking part in an operation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Planes: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

/// What to do when only part of a combined depth-stencil surface is requested
/// and the backend cannot address planes separately
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialPlanePolicy {
    /// Save the other plane, operate on both, write the saved plane back
    PreserveAndRewrite,
    /// Operate on the whole surface
    Widen,
    /// Do nothing
    Skip,
    /// Fail with `UnsupportedOperation`
    Reject,
}

/// Outcome of `plan_depth_stencil`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthStencilPlan {
    /// Nothing to do
    Skip,
    /// Issue the operation on these planes
    Direct(Planes),
    /// Snapshot `preserve`, operate on `write | preserve`, restore `preserve`
    PreserveAndRewrite { write: Planes, preserve: Planes },
}

/// Decide how to run an operation on `requested` planes of a surface
/// holding `surface` planes
///
/// Requested planes the surface lacks are dropped.
pub fn plan_depth_stencil(
    requested: Planes,
    surface: Planes,
    separate_supported: bool,
    policy: PartialPlanePolicy,
) -> Result<DepthStencilPlan> {
    let surface = surface & Planes::DEPTH_STENCIL;
    let requested = requested & surface;

    if requested.is_empty() {
        return Ok(DepthStencilPlan::Skip);
    }
    if requested == surface || separate_supported {
        return Ok(DepthStencilPlan::Direct(requested));
    }

    match policy {
        PartialPlanePolicy::PreserveAndRewrite => Ok(DepthStencilPlan::PreserveAndRewrite {
            write: requested,
            preserve: surface - requested,
        }),
        PartialPlanePolicy::Widen => Ok(DepthStencilPlan::Direct(surface)),
        PartialPlanePolicy::Skip => Ok(DepthStencilPlan::Skip),
        PartialPlanePolicy::Reject => Err(crate::shim_err!("fbt::Planes",
            Error::UnsupportedOperation(format!(
                "Backend cannot address {:?} separately on a combined depth-stencil surface",
                requested)))),
    }
}

/// Run `op` on the planes chosen by `plan`
///
/// `op` receives the planes to operate on. For `PreserveAndRewrite` the
/// preserved plane is read from `area` of `target` before `op` and written
/// back after it.
pub fn apply_depth_stencil_plan<F>(
    device: &mut dyn Device,
    target: &dyn RenderTarget,
    area: Rect,
    plan: DepthStencilPlan,
    op: F,
) -> Result<()>
where
    F: FnOnce(&mut dyn Device, Planes) -> Result<()>,
{
    match plan {
        DepthStencilPlan::Skip => Ok(()),
        DepthStencilPlan::Direct(planes) => op(device, planes),
        DepthStencilPlan::PreserveAndRewrite { write, preserve } => {
            crate::shim_trace!("fbt::Planes", "Preserving {:?} around {:?} write", preserve, write);
            let snapshot = device.read_depth_stencil(target, area, preserve)?;
            op(device, write | preserve)?;
            device.write_depth_stencil(target, &snapshot)
        }
    }
}

#[cfg(test)]
#[path = "planes_tests.rs"]
mod tests;
