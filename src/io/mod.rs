pub mod graph_csv;
