//! Drives a whole conversion: decode, preprocess, render every size, pack.

use crate::error::{Error, Result};
use crate::icondir::{encode, IcoContainer};
use crate::preprocess::Preprocess;
use crate::raster::{EncodedRaster, RenderedIcon};
use crate::resample::render;
use crate::settings::ConversionSettings;
use crate::size::TargetSize;
use crate::source::SourceImage;
use std::time::{Duration, Instant};

//===========================================================================//

/// Hooks invoked around each conversion.  Every method defaults to doing
/// nothing.
pub trait ConversionObserver: Send + Sync {
    /// Called before decoding starts.
    fn on_conversion_start(&self, _settings: &ConversionSettings) {}

    /// Called once the conversion has finished, whether or not it succeeded.
    fn on_conversion_complete(
        &self,
        _duration: Duration,
        _settings: &ConversionSettings,
        _success: bool,
    ) {
    }

    /// Called with the error that aborted a conversion.
    fn on_error(&self, _error: &Error) {}
}

/// An observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

//===========================================================================//

/// Everything one conversion produces.
#[derive(Clone, Debug)]
pub struct ConversionOutput {
    icons: Vec<RenderedIcon>,
    ico: IcoContainer,
}

impl ConversionOutput {
    /// Returns the rendered icons, smallest first.
    pub fn icons(&self) -> &[RenderedIcon] {
        &self.icons
    }

    /// Returns the icon rendered at `size`, if it was requested.
    pub fn icon(&self, size: TargetSize) -> Option<&RenderedIcon> {
        self.icons.iter().find(|icon| icon.size() == size)
    }

    /// Returns the ICO file holding every rendered icon.
    pub fn ico(&self) -> &IcoContainer {
        &self.ico
    }

    /// Splits the output into its parts.
    pub fn into_parts(self) -> (Vec<RenderedIcon>, IcoContainer) {
        (self.icons, self.ico)
    }
}

//===========================================================================//

/// Converts source images into favicon bundles.
pub struct Converter {
    settings: ConversionSettings,
    preprocess: Option<Box<dyn Preprocess>>,
    observer: Box<dyn ConversionObserver>,
}

impl Converter {
    /// Creates a converter with the given settings, no preprocessing, and no
    /// observer.
    pub fn new(settings: ConversionSettings) -> Converter {
        Converter {
            settings,
            preprocess: None,
            observer: Box::new(NoopObserver),
        }
    }

    /// Runs `preprocess` on every decoded source before resampling.
    pub fn with_preprocess<P: Preprocess + 'static>(
        mut self,
        preprocess: P,
    ) -> Converter {
        self.preprocess = Some(Box::new(preprocess));
        self
    }

    /// Reports conversion events to `observer`.
    pub fn with_observer<O: ConversionObserver + 'static>(
        mut self,
        observer: O,
    ) -> Converter {
        self.observer = Box::new(observer);
        self
    }

    /// Returns the settings used for every conversion.
    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Decodes `bytes` and converts the result.
    pub fn convert(&self, bytes: &[u8]) -> Result<ConversionOutput> {
        self.observe(|| SourceImage::decode(bytes).and_then(|s| self.run(s)))
    }

    /// Converts an already-decoded source image.
    pub fn convert_image(
        &self,
        source: &SourceImage,
    ) -> Result<ConversionOutput> {
        self.observe(|| self.run(source.clone()))
    }

    fn observe<F>(&self, conversion: F) -> Result<ConversionOutput>
    where
        F: FnOnce() -> Result<ConversionOutput>,
    {
        self.observer.on_conversion_start(&self.settings);
        let start = Instant::now();
        let result = self.settings.validate().and_then(|()| conversion());
        let duration = start.elapsed();
        match result {
            Ok(ref output) => {
                tracing::debug!(
                    icons = output.icons().len(),
                    ico_bytes = output.ico().len(),
                    ?duration,
                    "Conversion finished"
                );
            }
            Err(ref error) => {
                tracing::warn!(%error, ?duration, "Conversion failed");
                self.observer.on_error(error);
            }
        }
        self.observer.on_conversion_complete(
            duration,
            &self.settings,
            result.is_ok(),
        );
        result
    }

    fn run(&self, source: SourceImage) -> Result<ConversionOutput> {
        let source = match self.preprocess {
            Some(ref preprocess) => preprocess.apply(source)?,
            None => source,
        };
        let icons = self.render_all(&source)?;
        let rasters: Vec<EncodedRaster> =
            icons.iter().map(|icon| icon.raster().clone()).collect();
        let ico = encode(&rasters)?;
        Ok(ConversionOutput { icons, ico })
    }

    #[cfg(not(feature = "rayon"))]
    fn render_all(&self, source: &SourceImage) -> Result<Vec<RenderedIcon>> {
        let quality = self.settings.quality;
        self.settings
            .sizes
            .iter()
            .map(|size| render_one(source, size, quality))
            .collect()
    }

    #[cfg(feature = "rayon")]
    fn render_all(&self, source: &SourceImage) -> Result<Vec<RenderedIcon>> {
        use rayon::prelude::*;

        let quality = self.settings.quality;
        let sizes: Vec<TargetSize> = self.settings.sizes.iter().collect();
        // Indexed collection keeps the ascending order of `sizes`, and the
        // first failing size (in that order) is the one reported.
        let results: Vec<Result<RenderedIcon>> = sizes
            .par_iter()
            .map(|&size| render_one(source, size, quality))
            .collect();
        results.into_iter().collect()
    }
}

fn render_one(
    source: &SourceImage,
    size: TargetSize,
    quality: f32,
) -> Result<RenderedIcon> {
    render(source, size, quality).map_err(|error| {
        tracing::error!(%size, %error, "Cannot render icon");
        error.for_size(size.pixels())
    })
}

//===========================================================================//


//===========================================================================//
