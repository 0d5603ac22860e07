// ==========================================
// 货运物流系统 - 货运单 Repository 实现
// ==========================================
// 职责: 实现货运单数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

mod core;

#[cfg(test)]
mod tests;

pub use self::core::ShipmentRepositoryImpl;
