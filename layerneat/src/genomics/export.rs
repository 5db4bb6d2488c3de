use super::Genome;

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

impl Genome {
    /// Writes the genome's expressed genes, one per line,
    /// as `innovation, input, output, weight`, in
    /// insertion order.
    ///
    /// # Errors
    /// Returns any error raised by the writer.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{ConnectionGene, Genome};
    ///
    /// let mut genome = Genome::new(1, 1).unwrap();
    /// genome.add_connection_gene(ConnectionGene::new(0, 0, 1, 0.5));
    /// genome.add_connection_gene(ConnectionGene::new(1, 2, 1, -1.0));
    /// genome.connection_mut(1).unwrap().disable();
    ///
    /// let mut buffer = vec![];
    /// genome.write_connections(&mut buffer).unwrap();
    /// assert_eq!(String::from_utf8(buffer).unwrap(), "0, 0, 1, 0.5\n");
    /// ```
    pub fn write_connections<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for gene in self.connections.iter().filter(|g| g.expressed()) {
            writeln!(
                writer,
                "{}, {}, {}, {}",
                gene.innovation(),
                gene.input(),
                gene.output(),
                gene.weight()
            )?;
        }
        Ok(())
    }

    /// Saves the genome's expressed genes to a file,
    /// replacing it if it exists.
    /// See [`write_connections`] for the format.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    ///
    /// [`write_connections`]: Genome::write_connections
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_connections(&mut writer)?;
        writer.flush()
    }
}

/// Diagnostic dump: the nodes of each layer, from the
/// top layer down, then a table of every gene with its
/// innovation number, endpoints, status and weight.
impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Genome ({} nodes, {} connections, {} layers)",
            self.nodes.len(),
            self.connections.len(),
            self.layer_count
        )?;

        for layer in (0..self.layer_count).rev() {
            write!(f, "\n Layer {} : ", layer)?;
            for node in self.nodes.iter().filter(|n| n.layer() == layer) {
                write!(f, "  {:>2} {:<6}  ", node.id(), node.node_type())?;
            }
        }

        write!(f, "\nConnections  :  ")?;
        if self.connections.is_empty() {
            return write!(f, "No connections");
        }

        writeln!(f)?;
        for gene in &self.connections {
            write!(f, "|  {:>3}   ", gene.innovation())?;
        }
        writeln!(f, "|")?;
        for gene in &self.connections {
            write!(f, "| {:>2}->{:>2} ", gene.input(), gene.output())?;
        }
        writeln!(f, "|")?;
        for gene in &self.connections {
            write!(f, "| {:>5}  ", if gene.expressed() { " " } else { "DISAB" })?;
        }
        writeln!(f, "|")?;
        for gene in &self.connections {
            write!(f, "|{:>8.5}", gene.weight())?;
        }
        write!(f, "|")
    }
}
