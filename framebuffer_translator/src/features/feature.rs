/// Feature catalogue.
///
/// Each entry pairs a stable enum key with the camelCase name used by
/// configuration overrides and string lookups.

macro_rules! feature_catalogue {
    ($( $(#[$doc:meta])* $variant:ident => $name:literal, )*) => {
        /// Known workaround features
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Feature {
            $( $(#[$doc])* $variant, )*
        }

        impl Feature {
            /// Every feature of the catalogue, in declaration order
            pub const ALL: &'static [Feature] = &[$(Feature::$variant,)*];

            /// Stable camelCase name
            pub fn name(self) -> &'static str {
                match self {
                    $(Feature::$variant => $name,)*
                }
            }

            /// Look up a feature by its camelCase name
            pub fn from_name(name: &str) -> Option<Feature> {
                match name {
                    $($name => Some(Feature::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

feature_catalogue! {
    /// Clip the blit source rectangle to the source bounds and rescale the
    /// destination rectangle to match.
    AdjustSrcDstRegionForBlitFramebuffer => "adjustSrcDstRegionForBlitFramebuffer",

    /// Split depth-only / stencil-only blits on combined surfaces into a
    /// joint blit plus a restore of the untouched plane.
    DepthStencilBlitExtraCopy => "depthStencilBlitExtraCopy",

    /// Never use the copy primitive for flipped blits.
    DisableFlippingBlitWithCommand => "disableFlippingBlitWithCommand",

    /// Clear values containing exact 0.0 or 1.0 components are mishandled by
    /// the native clear; use a draw instead.
    ClearToZeroOrOneBroken => "clearToZeroOrOneBroken",

    /// Issue every color clear twice.
    CallClearTwice => "callClearTwice",

    /// Always clear color through a draw.
    PreferDrawClearOverClearAttachments => "preferDrawClearOverClearAttachments",

    /// Emulate per-attachment color masks with a masked draw instead of a
    /// read-modify-write of the texels.
    EmulateIndependentColorMasks => "emulateIndependentColorMasks",

    /// Clear one plane of a combined depth-stencil surface by saving the other
    /// plane, clearing both, and writing the saved plane back.
    PreserveUnclearedDepthStencilPlane => "preserveUnclearedDepthStencilPlane",

    /// Without native discard hints, clear invalidated attachments to zero.
    ClearInvalidatedAttachmentsToZero => "clearInvalidatedAttachmentsToZero",

    /// In legacy EXT discard, naming depth or stencil alone discards the
    /// whole combined surface.
    DiscardPartialDepthStencilForExt => "discardPartialDepthStencilForExt",

    /// Do not invalidate attachments stored in a substituted format.
    PreferSkippingInvalidateForEmulatedFormats => "preferSkippingInvalidateForEmulatedFormats",

    /// Store 16-bit packed color formats as 8 bits per channel.
    PromotePackedFormatsTo8BitPerChannel => "promotePackedFormatsTo8BitPerChannel",

    /// Store D24S8 as D32F-S8.
    ForceD24S8AsUnsupported => "forceD24S8AsUnsupported",
}
