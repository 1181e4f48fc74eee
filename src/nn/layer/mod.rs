mod gat_conv;
mod gcn_conv;

pub use gat_conv::GatConv;
pub use gcn_conv::GcnConv;
