use crate::convert::ConversionOutput;

//===========================================================================//

/// Identifies one conversion request within a `Session`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RequestToken {
    generation: u64,
}

impl RequestToken {
    /// Returns the generation number of the request.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

//===========================================================================//

/// Holds the most recent conversion output and discards results that arrive
/// for requests that have since been superseded.
///
/// Each output is owned by the session, so replacing or resetting it releases
/// the old buffers exactly once.
#[derive(Debug, Default)]
pub struct Session {
    generation: u64,
    current: Option<ConversionOutput>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Session {
        Session::default()
    }

    /// Starts a new request.  Any request started earlier becomes stale.
    pub fn begin(&mut self) -> RequestToken {
        self.generation += 1;
        tracing::debug!(generation = self.generation, "Began request");
        RequestToken { generation: self.generation }
    }

    /// Returns true if `token` belongs to the most recently started request.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.generation == self.generation
    }

    /// Installs `output` as the current result if `token` is still current,
    /// releasing the previous output.  Stale results are dropped instead.
    /// Returns true if the output was installed.
    pub fn commit(
        &mut self,
        token: RequestToken,
        output: ConversionOutput,
    ) -> bool {
        if !self.is_current(token) {
            tracing::debug!(
                stale = token.generation,
                current = self.generation,
                "Discarding result of superseded request"
            );
            drop(output);
            return false;
        }
        if self.current.replace(output).is_some() {
            tracing::debug!(
                generation = token.generation,
                "Released previous output"
            );
        }
        true
    }

    /// Returns the current output, if any.
    pub fn current(&self) -> Option<&ConversionOutput> {
        self.current.as_ref()
    }

    /// Releases the current output and invalidates every outstanding token.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.current = None;
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::convert::Converter;
    use crate::settings::ConversionSettings;
    use crate::size::TargetSize;
    use crate::source::SourceImage;

    fn output(size: TargetSize) -> crate::convert::ConversionOutput {
        let source =
            SourceImage::from_rgba_data(1, 1, vec![0, 0, 0, 255]).unwrap();
        Converter::new(ConversionSettings::with_sizes(vec![size]))
            .convert_image(&source)
            .unwrap()
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut session = Session::new();
        let first = session.begin();
        let second = session.begin();
        assert!(!session.is_current(first));
        assert!(session.commit(second, output(TargetSize::S32)));
        assert!(!session.commit(first, output(TargetSize::S16)));
        let current = session.current().unwrap();
        assert_eq!(current.icons()[0].size(), TargetSize::S32);
    }

    #[test]
    fn newer_result_replaces_older() {
        let mut session = Session::new();
        let token = session.begin();
        assert!(session.commit(token, output(TargetSize::S16)));
        let token = session.begin();
        assert!(session.commit(token, output(TargetSize::S48)));
        let current = session.current().unwrap();
        assert_eq!(current.icons().len(), 1);
        assert_eq!(current.icons()[0].size(), TargetSize::S48);
    }

    #[test]
    fn reset_releases_and_invalidates() {
        let mut session = Session::new();
        let token = session.begin();
        assert!(session.commit(token, output(TargetSize::S16)));
        session.reset();
        assert!(session.current().is_none());
        assert!(!session.commit(token, output(TargetSize::S16)));
        assert!(session.current().is_none());
    }
}

//===========================================================================//
