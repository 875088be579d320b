/*!

A "logger" for builds without the `logging` feature. It outputs nothing but satisfies the public
API.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    pub(in crate::log) fn set_config(&mut self) {
        let most_verbose = self
            .module_configurations
            .values()
            .map(|module_config| module_config.level)
            .fold(self.global_log_level, std::cmp::max);
        log::set_max_level(most_verbose);
    }
}
