use crate::animation::count_up::{CountUp, CountUpOptions};
use crate::models::stat_models::StatDefinition;
use crate::runtime::frames::AnimationHost;
use crate::runtime::viewport::ElementId;
use crate::utils::format_utils::format_stat;

/// A labelled statistic that counts up once it scrolls into view.
pub struct AnimatedStat {
    definition: StatDefinition,
    counter: CountUp,
}

impl AnimatedStat {
    pub fn mount(host: &AnimationHost, element: Option<ElementId>, definition: StatDefinition) -> Self {
        let options = CountUpOptions::new(definition.end).duration_ms(definition.duration_ms);
        Self {
            definition,
            counter: CountUp::mount(host, element, options),
        }
    }

    /// Text for the number line, e.g. `"280+"`.
    pub fn display(&self) -> String {
        format_stat(self.definition.prefix, self.counter.value(), self.definition.suffix)
    }

    pub fn label(&self) -> &'static str {
        self.definition.label
    }

    pub fn counter(&self) -> &CountUp {
        &self.counter
    }
}
