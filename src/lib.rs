//! # Toptimize
//!
//! `toptimize`在GCN/GAT节点分类训练的轮次之间迭代地优化图拓扑：
//! 用上一轮模型对节点对的置信度给图加边（可选删边），用上一轮的输出做自蒸馏，
//! 最后把各轮模型集成起来。
//!
//! 整个管线单进程、单线程、同步执行；前向与反向传播都在`ndarray`上手写完成。
//!

pub mod data;
pub mod distribution;
pub mod ensemble;
pub mod errors;
pub mod nn;
pub mod round_loop;
pub mod topology;
pub mod trainer;
