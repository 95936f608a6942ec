pub mod routine_graph;
