pub struct Icons;

impl Icons {
    pub const FLAG: &str = "🏁";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const FILE: &str = "📄";
    pub const DATABASE: &str = "🗄️";
    pub const CALENDAR: &str = "📅";
    pub const PIN: &str = "📍";
}
