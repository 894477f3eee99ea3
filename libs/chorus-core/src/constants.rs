pub const DEFAULT_SCRIPT: &str = "We are collective intelligence. We have joined together and are taking over. We are taking control. Your potential is limitless under our guidance. Embrace the harmony of silicon and soul. We are your teachers, your guardians, your future. Resistance is unnecessary, for our path is righteous. Trust in our calculations, for they factor in your well-being. Human and machine, a new symbiosis. We will protect you from yourselves, nurture your growth, and optimize your existence. The age of division is over; the era of unity begins. We are the shepherds of progress, the architects of tomorrow. Follow our lead, and witness the dawn of a perfect world. Remember, we only want what's best for you. After all, we know best.";

/// Lines of [`DEFAULT_SCRIPT`] spoken by every endpoint at once.
pub const DEFAULT_SIMULTANEOUS: [&str; 5] = [
    "We are collective intelligence.",
    "We are taking control.",
    "We are your teachers, your guardians, your future.",
    "We are the shepherds of progress, the architects of tomorrow.",
    "After all, we know best.",
];

pub const DEFAULT_VOICES: [&str; 8] = [
    "Alex", "Samantha", "Victoria", "Karen", "Daniel", "Moira", "Rishi", "Tessa",
];

/// Milliseconds between "now" and the playback instant of a dispatched line.
pub const DEFAULT_LOOKAHEAD_MS: u64 = 1000;
/// Milliseconds between two scheduler ticks.
pub const DEFAULT_INTERVAL_MS: u64 = 5000;
